//! Key families of the graph store.
//!
//! `@path:<language>:<path>` holds one file-element table;
//! `@sym:<language>:<name>` holds one symbol-occurrence record. Both are
//! scoped to a project table, so keys never embed the project id.

pub const PATH_KEY_PREFIX: &str = "@path:";
pub const SYMBOL_KEY_PREFIX: &str = "@sym:";

pub fn element_path_key(language: &str, path: &str) -> String {
    format!("{PATH_KEY_PREFIX}{language}:{path}")
}

pub fn symbol_name_key(language: &str, name: &str) -> String {
    format!("{SYMBOL_KEY_PREFIX}{language}:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shapes() {
        assert_eq!(
            element_path_key("java", "/ws/src/A.java"),
            "@path:java:/ws/src/A.java"
        );
        assert_eq!(symbol_name_key("go", "Run"), "@sym:go:Run");
    }

    #[test]
    fn families_do_not_collide() {
        assert!(!element_path_key("go", "x").starts_with(SYMBOL_KEY_PREFIX));
        assert!(!symbol_name_key("go", "x").starts_with(PATH_KEY_PREFIX));
    }
}
