//! SystemVerilog (IEEE 1800-2017) reserved word set and identifier sanitising.

use std::collections::HashSet;

/// The frozen set of SystemVerilog-2017 reserved words that cannot be used
/// as identifiers in emitted output.
pub const RESERVED_WORDS: &[&str] = &[
    "accept_on", "alias", "always", "always_comb", "always_ff", "always_latch", "and",
    "assert", "assign", "assume", "automatic", "before", "begin", "bind", "bins", "binsof",
    "bit", "break", "buf", "bufif0", "bufif1", "byte", "case", "casex", "casez", "cell",
    "chandle", "checker", "class", "clocking", "cmos", "config", "const", "constraint",
    "context", "continue", "cover", "covergroup", "coverpoint", "cross", "deassign",
    "default", "defparam", "design", "disable", "dist", "do", "edge", "else", "end",
    "endcase", "endchecker", "endclass", "endclocking", "endconfig", "endfunction",
    "endgenerate", "endgroup", "endinterface", "endmodule", "endpackage", "endprimitive",
    "endprogram", "endproperty", "endspecify", "endsequence", "endtable", "endtask",
    "enum", "event", "eventually", "expect", "export", "extends", "extern", "final",
    "first_match", "for", "force", "foreach", "forever", "fork", "forkjoin", "function",
    "generate", "genvar", "global", "highz0", "highz1", "if", "iff", "ifnone",
    "ignore_bins", "illegal_bins", "implements", "implies", "import", "incdir", "include",
    "initial", "inout", "input", "inside", "instance", "int", "integer", "interconnect",
    "interface", "intersect", "join", "join_any", "join_none", "large", "let", "liblist",
    "library", "local", "localparam", "logic", "longint", "macromodule", "matches",
    "medium", "modport", "module", "nand", "negedge", "nettype", "new", "nexttime", "nmos",
    "nor", "noshowcancelled", "not", "notif0", "notif1", "null", "or", "output", "package",
    "packed", "parameter", "pmos", "posedge", "primitive", "priority", "program",
    "property", "protected", "pull0", "pull1", "pulldown", "pullup",
    "pulsestyle_ondetect", "pulsestyle_onevent", "pure", "rand", "randc", "randcase",
    "randsequence", "rcmos", "real", "realtime", "ref", "reg", "reject_on", "release",
    "repeat", "restrict", "return", "rnmos", "rpmos", "rtran", "rtranif0", "rtranif1",
    "s_always", "s_eventually", "s_nexttime", "s_until", "s_until_with", "scalared",
    "sequence", "shortint", "shortreal", "showcancelled", "signed", "small", "soft",
    "solve", "specify", "specparam", "static", "string", "strong", "strong0", "strong1",
    "struct", "super", "supply0", "supply1", "sync_accept_on", "sync_reject_on", "table",
    "tagged", "task", "this", "throughout", "time", "timeprecision", "timeunit", "tran",
    "tranif0", "tranif1", "tri", "tri0", "tri1", "triand", "trior", "trireg", "type",
    "typedef", "union", "unique", "unique0", "unsigned", "until", "until_with", "untyped",
    "use", "uwire", "var", "vectored", "virtual", "void", "wait", "wait_order", "wand",
    "weak", "weak0", "weak1", "while", "wildcard", "wire", "with", "within", "wor",
    "xnor", "xor",
];

/// A per-scope identifier uniquifier: sanitises names to the SystemVerilog
/// identifier grammar and avoids both reserved words and earlier names in
/// the same scope.
pub struct Uniquifier {
    reserved: HashSet<&'static str>,
    used: HashSet<String>,
}

impl Uniquifier {
    /// Creates a uniquifier for a fresh scope.
    pub fn new() -> Self {
        Uniquifier {
            reserved: RESERVED_WORDS.iter().copied().collect(),
            used: HashSet::new(),
        }
    }

    /// Sanitises `name` to `[A-Za-z_][A-Za-z0-9_]*` and returns a name that
    /// is unique within this scope and not a reserved word. `protect` pins
    /// the exact sanitised name, failing uniquification instead of
    /// appending a suffix (for user-reserved names).
    pub fn unique(&mut self, name: &str, protect: bool) -> Result<String, String> {
        let sanitised = sanitise(name);
        let candidate_reserved_or_used = |c: &str, used: &HashSet<String>, reserved: &HashSet<&str>| {
            reserved.contains(c) || used.contains(c)
        };
        if protect {
            if candidate_reserved_or_used(&sanitised, &self.used, &self.reserved) {
                return Err(format!("reserved name '{name}' is unavailable"));
            }
            self.used.insert(sanitised.clone());
            return Ok(sanitised);
        }
        let mut candidate = sanitised.clone();
        let mut n = 1u32;
        while candidate_reserved_or_used(&candidate, &self.used, &self.reserved) {
            candidate = format!("{sanitised}_{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        Ok(candidate)
    }
}

impl Default for Uniquifier {
    fn default() -> Self {
        Self::new()
    }
}

fn sanitise(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        out.push(if ok { c } else { '_' });
    }
    if out.is_empty() || out.chars().next().unwrap().is_ascii_digit() {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitises_invalid_chars() {
        assert_eq!(sanitise("my-signal[3]"), "my_signal_3_");
    }

    #[test]
    fn sanitises_leading_digit() {
        assert_eq!(sanitise("3count"), "_3count");
    }

    #[test]
    fn uniquifies_duplicate_names() {
        let mut u = Uniquifier::new();
        assert_eq!(u.unique("q", false).unwrap(), "q");
        assert_eq!(u.unique("q", false).unwrap(), "q_1");
        assert_eq!(u.unique("q", false).unwrap(), "q_2");
    }

    #[test]
    fn avoids_reserved_words() {
        let mut u = Uniquifier::new();
        assert_eq!(u.unique("wire", false).unwrap(), "wire_1");
    }

    #[test]
    fn protected_collision_errors() {
        let mut u = Uniquifier::new();
        u.unique("clk", true).unwrap();
        assert!(u.unique("clk", true).is_err());
    }
}
