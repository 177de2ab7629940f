//! Flattening a command tree into its leaf commands.

use std::collections::HashSet;

use crate::command::{CommandNode, Flag};

/// A leaf of a command tree, with the path and flags it inherits.
#[derive(Debug, Clone)]
pub struct LeafCommand<'a> {
    node: &'a CommandNode,
    path: Vec<String>,
    inherited: Vec<&'a Flag>,
}

impl<'a> LeafCommand<'a> {
    pub fn node(&self) -> &'a CommandNode {
        self.node
    }

    /// Names from the root's child down to the leaf. The root's own name is
    /// not part of the path; a childless root has an empty path.
    pub fn full_path(&self) -> &[String] {
        &self.path
    }

    pub fn local_flags(&self) -> impl Iterator<Item = &'a Flag> + '_ {
        self.node.flags().iter()
    }

    /// Persistent flags of ancestors, nearest first, minus names declared on
    /// the leaf itself.
    pub fn inherited_flags(&self) -> impl Iterator<Item = &'a Flag> + '_ {
        self.inherited.iter().copied().filter(|f| {
            !self
                .node
                .flags()
                .iter()
                .any(|local| local.name() == f.name())
        })
    }

    /// Local flags followed by inherited ones, one entry per name.
    pub fn all_flags(&self) -> Vec<&'a Flag> {
        let mut merged: Vec<&'a Flag> = Vec::new();
        for flag in self.local_flags().chain(self.inherited_flags()) {
            match merged.iter_mut().find(|f| f.name() == flag.name()) {
                Some(slot) => *slot = flag,
                None => merged.push(flag),
            }
        }
        merged
    }
}

/// Collect the leaves of `root` in declaration order (pre-order).
///
/// Groups (nodes with children) are never emitted. Hidden nodes are kept;
/// filtering is left to the caller.
pub fn leaf_commands(root: &CommandNode) -> Vec<LeafCommand<'_>> {
    struct Frame<'a> {
        node: &'a CommandNode,
        path: Vec<String>,
        inherited: Vec<&'a Flag>,
    }

    let mut leaves = Vec::new();
    let mut stack = vec![Frame {
        node: root,
        path: Vec::new(),
        inherited: Vec::new(),
    }];

    while let Some(frame) = stack.pop() {
        if frame.node.is_leaf() {
            leaves.push(LeafCommand {
                node: frame.node,
                path: frame.path,
                inherited: frame.inherited,
            });
            continue;
        }

        // nearest ancestor first; a name defined closer shadows farther ones
        let mut inherited: Vec<&Flag> = frame.node.persistent_flags().collect();
        let seen: HashSet<&str> = inherited.iter().map(|f| f.name()).collect();
        inherited.extend(
            frame
                .inherited
                .iter()
                .copied()
                .filter(|f| !seen.contains(f.name())),
        );

        for child in frame.node.children().iter().rev() {
            let mut path = frame.path.clone();
            path.push(child.name().to_string());
            stack.push(Frame {
                node: child,
                path,
                inherited: inherited.clone(),
            });
        }
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(leaves: &[LeafCommand<'_>]) -> Vec<String> {
        leaves.iter().map(|l| l.full_path().join(" ")).collect()
    }

    #[test]
    fn collects_leaves_in_declaration_order() {
        let root = CommandNode::new("root")
            .subcommand(CommandNode::new("a"))
            .subcommand(
                CommandNode::new("g")
                    .subcommand(CommandNode::new("x"))
                    .subcommand(CommandNode::new("y").subcommand(CommandNode::new("z"))),
            )
            .subcommand(CommandNode::new("b"));
        let leaves = leaf_commands(&root);
        assert_eq!(names(&leaves), vec!["a", "g x", "g y z", "b"]);
    }

    #[test]
    fn childless_root_is_a_leaf_with_empty_path() {
        let root = CommandNode::new("solo");
        let leaves = leaf_commands(&root);
        assert_eq!(leaves.len(), 1);
        assert!(leaves[0].full_path().is_empty());
        assert_eq!(leaves[0].node().name(), "solo");
    }

    #[test]
    fn hidden_nodes_are_not_filtered_here() {
        let root = CommandNode::new("root")
            .subcommand(CommandNode::new("secret").hide())
            .subcommand(CommandNode::new("grp").hide().subcommand(CommandNode::new("inner")));
        assert_eq!(names(&leaf_commands(&root)), vec!["secret", "grp inner"]);
    }

    #[test]
    fn inherits_persistent_flags_nearest_first() {
        let root = CommandNode::new("root")
            .persistent_flag(Flag::bool("verbose", false, "root verbose"))
            .persistent_flag(Flag::string("output", "text", "root output"))
            .flag(Flag::int("local-only", 0, "not inherited"))
            .subcommand(
                CommandNode::new("grp")
                    .persistent_flag(Flag::string("output", "json", "group output"))
                    .subcommand(
                        CommandNode::new("leaf")
                            .flag(Flag::bool("verbose", true, "leaf verbose"))
                            .flag(Flag::int("n", 1, "n")),
                    ),
            );
        let leaves = leaf_commands(&root);
        let leaf = &leaves[0];

        let inherited: Vec<&str> = leaf.inherited_flags().map(|f| f.usage()).collect();
        assert_eq!(inherited, vec!["group output"]);

        let all: Vec<(&str, &str)> = leaf
            .all_flags()
            .iter()
            .map(|f| (f.name(), f.usage()))
            .collect();
        assert_eq!(
            all,
            vec![
                ("verbose", "leaf verbose"),
                ("n", "n"),
                ("output", "group output"),
            ]
        );
    }
}
