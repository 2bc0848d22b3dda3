//! On-disk planner configuration trees for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::fixtures::docs;
use crate::paths::temp_test_dir;

/// A temporary directory holding `planner.yaml`, a recipe directory, a
/// flavour list and an inventory.
///
/// ```ignore
/// let tree = ConfigTree::new()
///     .recipe("t2m", docs::T2M_RECIPE)
///     .inventory(&inventory_yaml(&[("t2m", &[0, 6])], &[]));
/// let config = PlannerConfig::load(tree.config_path()).unwrap();
/// ```
pub struct ConfigTree {
    dir: TempDir,
}

impl ConfigTree {
    /// An empty tree with the default flavours and an empty inventory.
    pub fn new() -> Self {
        let tree = Self {
            dir: temp_test_dir(),
        };
        fs::create_dir_all(tree.path().join("recipes")).expect("create recipes dir");
        tree.write("flavours.yaml", docs::FLAVOURS)
            .write("inventory.yaml", "[]\n")
            .write(
                "planner.yaml",
                "recipes_dir: recipes\nflavours: flavours.yaml\ninventory: inventory.yaml\noutput_dir: out\nlogging:\n  level: debug\n  format: pretty\n",
            )
    }

    fn write(self, relpath: &str, content: &str) -> Self {
        fs::write(self.path().join(relpath), content).expect("write config file");
        self
    }

    pub fn recipe(self, name: &str, content: &str) -> Self {
        self.write(&format!("recipes/{name}.yaml"), content)
    }

    pub fn flavours(self, content: &str) -> Self {
        self.write("flavours.yaml", content)
    }

    pub fn inventory(self, content: &str) -> Self {
        self.write("inventory.yaml", content)
    }

    pub fn config(self, content: &str) -> Self {
        self.write("planner.yaml", content)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("planner.yaml")
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_layout() {
        let tree = ConfigTree::new().recipe("t2m", docs::T2M_RECIPE);
        assert!(tree.config_path().exists());
        assert!(tree.path().join("recipes/t2m.yaml").exists());
        assert!(tree.path().join("flavours.yaml").exists());
        assert_eq!(
            fs::read_to_string(tree.path().join("inventory.yaml")).unwrap(),
            "[]\n"
        );
    }
}
