/// Canonical register names, indexed by register number.
pub const NAMES: [&str; 32] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", // 0..7
    "$t0", "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7", // 8..15
    "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7", // 16..23
    "$t8", "$t9", "$k0", "$k1", "$gp", "$sp", "$fp", "$ra", // 24..31
];

/// Register number for a name such as `$t0`. The `$` is part of the name.
pub fn index_of(name: &str) -> Option<u8> {
    NAMES.iter().position(|&n| n == name).map(|i| i as u8)
}

pub fn name_of(index: u8) -> Option<&'static str> {
    NAMES.get(index as usize).copied()
}
