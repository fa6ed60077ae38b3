//! Rendering of a resolved closure.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::closure::Closure;

#[derive(Debug, Serialize)]
pub struct ClosureReport<'a> {
    pub roots: usize,
    pub classes: usize,
    pub digest: String,
    pub duration_ms: u64,
    pub units: &'a Closure,
}

impl<'a> ClosureReport<'a> {
    pub fn new(closure: &'a Closure, roots: usize, duration_ms: u64) -> Self {
        Self {
            roots,
            classes: closure.len(),
            digest: hash_content(&render_text(closure)),
            duration_ms,
            units: closure,
        }
    }
}

/// The main dex list file format: one class file path per line.
pub fn render_text(closure: &Closure) -> String {
    let mut out = String::new();
    for name in closure {
        out.push_str(name.as_path());
        out.push('\n');
    }
    out
}

pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::ClassPath;
    use crate::closure::resolve_closure;
    use crate::fixture::ClassFileBuilder;
    use crate::name::UnitName;

    #[test]
    fn text_and_json_renderings_agree() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join("A.class"),
            ClassFileBuilder::new("A").type_ref("B").build(),
        )?;
        std::fs::write(dir.path().join("B.class"), ClassFileBuilder::new("B").build())?;

        let closure = resolve_closure(
            vec![UnitName::from_internal("A")],
            ClassPath::new(&[dir.path()])?,
        )?;
        assert_eq!(render_text(&closure), "A.class\nB.class\n");

        let report = ClosureReport::new(&closure, 1, 3);
        let json = serde_json::to_value(&report)?;
        assert_eq!(json["classes"], 2);
        assert_eq!(json["units"][1], "B.class");
        assert_eq!(json["digest"], hash_content("A.class\nB.class\n"));
        assert_eq!(report.digest.len(), 64);
        Ok(())
    }
}
