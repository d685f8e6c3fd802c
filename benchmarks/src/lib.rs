//! Sample programs shared by the pipeline benchmarks.

/// Simple arithmetic expression
pub const SIMPLE_EXPR: &str = "1 + 2 * 3 - 4 / 2";

/// Locals and assignment chains
pub const LOCALS: &str = "a = 1\nb = a + 2\nc = a + b\na + b + c";

/// Branch-heavy program
pub const BRANCHES: &str = "a = 7\nif a > 5\n  a - 5\nelse\n  a + 5\nend";

/// Loop that runs a few hundred iterations
pub const LOOP: &str = "a = 0\nwhile a < 500\n  a = a + 1\nend\na";

/// String building
pub const STRINGS: &str = "s = \"a\"\ns = s + \"b\"\ns = s + \"c\"\nlen(s)";
