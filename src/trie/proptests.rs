use super::*;
use crate::model::{Hash, TriePath, LEVEL_WIDTH};
use crate::ops::merge_plan;

use proptest::prelude::*;

fn shape() -> impl Strategy<Value = TrieShape> {
    let leaf = (0u32..10_000).prop_map(TrieShape::Leaf);
    leaf.prop_recursive(5, 96, LEVEL_WIDTH as u32, |inner| {
        prop::collection::vec(prop::option::of(inner), 0..=LEVEL_WIDTH).prop_map(TrieShape::Branch)
    })
}

fn check_paths(node: &Node<'_>) {
    if let Children::Slots(slots) = node.children() {
        for (i, child) in slots.iter().enumerate() {
            if let Some(child) = child {
                assert_eq!(child.path(), &node.path().extend(i as u8));
                check_paths(child);
            }
        }
    }
}

/// Walk two tries together, asserting both sides always name the same bucket.
///
/// A leaf facing a branch is carried into every slot of that branch, so the
/// check also covers tries built to different depths. `bucket_path` is the
/// bucket both sides are currently visiting.
fn check_lockstep<'a>(a: &Node<'a>, b: &Node<'a>, bucket_path: &TriePath) -> usize {
    for node in [a, b] {
        if node.is_leaf() {
            assert!(node.path().is_prefix_of(bucket_path));
        } else {
            assert_eq!(node.path(), bucket_path);
        }
    }

    let left = a.as_branch().map(Branch::children);
    let right = b.as_branch().map(Branch::children);
    let fan_out = match (&left, &right) {
        (None, None) => return 1,
        (Some(l), None) => l.len(),
        (None, Some(r)) => r.len(),
        (Some(l), Some(r)) => l.len().min(r.len()),
    };

    let mut pairs = 1;
    for i in 0..fan_out {
        let l = match &left {
            Some(children) => children[i].clone(),
            None => Some(a.clone()),
        };
        let r = match &right {
            Some(children) => children[i].clone(),
            None => Some(b.clone()),
        };
        if let (Some(l), Some(r)) = (l, r) {
            pairs += check_lockstep(&l, &r, &bucket_path.extend(i as u8));
        }
    }
    pairs
}

proptest! {
    #[test]
    fn prop_child_paths_extend_parent(shape in shape()) {
        let enc = TrieWriter::encode(&shape);
        prop_assert!(enc.validate().is_ok());
        check_paths(&HashTrie::new(&enc).root_node());
    }

    #[test]
    fn prop_view_reproduces_shape(shape in shape()) {
        let enc = TrieWriter::encode(&shape);
        let trie = HashTrie::new(&enc);
        prop_assert_eq!(trie.to_shape(), shape);
        prop_assert_eq!(trie.root_node(), trie.root_node());
        prop_assert_eq!(trie.stats().leaves, enc.leaf_count());
    }

    #[test]
    fn prop_lockstep_paths_align(a in shape(), b in shape()) {
        let ea = TrieWriter::encode(&a);
        let eb = TrieWriter::encode(&b);
        let visited = check_lockstep(
            &HashTrie::new(&ea).root_node(),
            &HashTrie::new(&eb).root_node(),
            &TriePath::root(),
        );
        prop_assert!(visited >= 1);
    }

    #[test]
    fn prop_merge_plan_covers_every_leaf(a in shape(), b in shape(), c in shape()) {
        let encodings = [TrieWriter::encode(&a), TrieWriter::encode(&b), TrieWriter::encode(&c)];
        let tries: Vec<_> = encodings.iter().map(HashTrie::new).collect();
        let plan = merge_plan(&tries);

        let mut prev: Option<&TriePath> = None;
        for task in plan.tasks() {
            prop_assert!(!task.leaves.is_empty());
            if let Some(prev) = prev {
                prop_assert!(prev < &task.path);
            }
            prev = Some(&task.path);
            for leaf in &task.leaves {
                prop_assert!(leaf.path.is_prefix_of(&task.path));
            }
        }

        for (i, trie) in tries.iter().enumerate() {
            for leaf in trie.leaves() {
                let covered = plan.tasks().iter().any(|task| {
                    task.leaves.iter().any(|l| {
                        l.trie == i && &l.path == leaf.path() && l.data_page_idx == leaf.data_page_idx()
                    })
                });
                prop_assert!(covered, "leaf {:?} of trie {} missing from plan", leaf, i);
            }
        }
    }

    #[test]
    fn prop_find_leaf_matches_hash_path(shape in shape(), bytes in any::<[u8; 32]>()) {
        let enc = TrieWriter::encode(&shape);
        let trie = HashTrie::new(&enc);
        let hash = Hash::from_bytes(bytes);

        if let Some(leaf) = trie.find_leaf(&hash) {
            prop_assert_eq!(leaf.path(), &hash.path(leaf.path().depth()));
            let covering = trie.leaves_under(&hash.path(leaf.path().depth()));
            prop_assert_eq!(covering, vec![leaf]);
        }
    }
}
