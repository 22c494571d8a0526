//! Stack detection
//!
//! Widgets of similar size that overlap substantially are treated as
//! interchangeable cards of one stack. Adjacency is not transitive on its own,
//! so stacks are the connected components of the pairwise adjacency graph.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::model::{GroupId, WidgetId, WidgetInstance};

use super::config::CanvasConfig;

/// A derived stack of widgets, recomputed on every frame
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub group_id: GroupId,
    /// Member ids, sorted
    pub instance_ids: Vec<WidgetId>,
}

impl Stack {
    pub fn len(&self) -> usize {
        self.instance_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance_ids.is_empty()
    }

    /// More than one member
    pub fn is_stacked(&self) -> bool {
        self.instance_ids.len() > 1
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.instance_ids.contains(id)
    }
}

/// Whether two placed widgets belong in the same stack
fn adjacent(a: &WidgetInstance, b: &WidgetInstance, config: &CanvasConfig) -> bool {
    let (Some(ra), Some(rb)) = (a.layout, b.layout) else {
        return false;
    };
    ra.similar_size(&rb, config.size_similarity) && ra.overlaps_inset(&rb, config.overlap_inset)
}

/// Partition widgets into stacks.
///
/// Disabled and unplaced widgets are ignored. Widgets that opted out of
/// grouping each get a standalone stack, listed after the clustered ones.
/// Clustered stacks appear in the order of their first member in `instances`.
pub fn compute_stacks(instances: &[&WidgetInstance], config: &CanvasConfig) -> Vec<Stack> {
    let placed = instances
        .iter()
        .copied()
        .filter(|inst| inst.enabled && inst.layout.is_some());
    let (groupable, standalone): (Vec<&WidgetInstance>, Vec<&WidgetInstance>) =
        placed.partition(|inst| !inst.group_disabled);

    let mut adjacency: HashMap<&WidgetId, Vec<&WidgetId>> = groupable
        .iter()
        .map(|inst| (&inst.instance_id, Vec::new()))
        .collect();

    for (i, a) in groupable.iter().enumerate() {
        for b in &groupable[i + 1..] {
            if adjacent(a, b, config) {
                trace!(a = %a.instance_id, b = %b.instance_id, "stack edge");
                adjacency.entry(&a.instance_id).or_default().push(&b.instance_id);
                adjacency.entry(&b.instance_id).or_default().push(&a.instance_id);
            }
        }
    }

    let mut visited: HashSet<&WidgetId> = HashSet::new();
    let mut stacks = Vec::new();

    for inst in &groupable {
        let start = &inst.instance_id;
        if !visited.insert(start) {
            continue;
        }

        let mut component: Vec<WidgetId> = Vec::new();
        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            component.push(node.clone());
            if let Some(neighbours) = adjacency.get(node) {
                for &neighbour in neighbours {
                    if visited.insert(neighbour) {
                        pending.push(neighbour);
                    }
                }
            }
        }

        component.sort();
        component.dedup();
        stacks.push(Stack {
            group_id: GroupId::from_members(&component),
            instance_ids: component,
        });
    }

    for inst in standalone {
        stacks.push(Stack {
            group_id: GroupId::standalone(&inst.instance_id),
            instance_ids: vec![inst.instance_id.clone()],
        });
    }

    stacks
}

/// The stack containing a widget
pub fn stack_of<'a>(stacks: &'a [Stack], id: &WidgetId) -> Option<&'a Stack> {
    stacks.iter().find(|stack| stack.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn widget(id: &str, x: f64, y: f64, w: f64, h: f64) -> WidgetInstance {
        WidgetInstance::new(id, "todo", Rect::new(x, y, w, h))
    }

    fn ids(stack: &Stack) -> Vec<&str> {
        stack.instance_ids.iter().map(WidgetId::as_str).collect()
    }

    #[test]
    fn test_overlapping_similar_widgets_stack() {
        let a = widget("a", 20.0, 20.0, 360.0, 260.0);
        let b = widget("b", 25.0, 24.0, 360.0, 260.0);
        let c = widget("c", 400.0, 20.0, 360.0, 260.0);
        let stacks = compute_stacks(&[&a, &b, &c], &CanvasConfig::default());

        assert_eq!(stacks.len(), 2);
        assert_eq!(ids(&stacks[0]), vec!["a", "b"]);
        assert_eq!(stacks[0].group_id.as_str(), "a|b");
        assert_eq!(ids(&stacks[1]), vec!["c"]);
        assert_eq!(stacks[1].group_id.as_str(), "c");
    }

    #[test]
    fn test_size_mismatch_prevents_stacking() {
        let a = widget("a", 0.0, 0.0, 300.0, 200.0);
        let b = widget("b", 0.0, 0.0, 341.0, 200.0);
        let stacks = compute_stacks(&[&a, &b], &CanvasConfig::default());
        assert_eq!(stacks.len(), 2);
    }

    #[test]
    fn test_sliver_overlap_prevents_stacking() {
        let a = widget("a", 0.0, 0.0, 300.0, 200.0);
        let b = widget("b", 290.0, 0.0, 300.0, 200.0);
        let stacks = compute_stacks(&[&a, &b], &CanvasConfig::default());
        assert_eq!(stacks.len(), 2);
    }

    #[test]
    fn test_transitive_closure() {
        // a-b and b-c overlap substantially; a-c are too far apart on their own
        let a = widget("a", 0.0, 0.0, 300.0, 200.0);
        let b = widget("b", 200.0, 0.0, 300.0, 200.0);
        let c = widget("c", 400.0, 0.0, 300.0, 200.0);
        let config = CanvasConfig::default();
        assert!(!adjacent(&a, &c, &config));

        let stacks = compute_stacks(&[&c, &a, &b], &config);
        assert_eq!(stacks.len(), 1);
        assert_eq!(ids(&stacks[0]), vec!["a", "b", "c"]);
        assert_eq!(stacks[0].group_id.as_str(), "a|b|c");
    }

    #[test]
    fn test_group_disabled_is_always_standalone() {
        let a = widget("a", 0.0, 0.0, 300.0, 200.0);
        let b = widget("b", 0.0, 0.0, 300.0, 200.0).group_disabled();
        let stacks = compute_stacks(&[&a, &b], &CanvasConfig::default());
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[0].group_id.as_str(), "a");
        assert_eq!(stacks[1].group_id.as_str(), "standalone:b");
    }

    #[test]
    fn test_unplaced_and_disabled_excluded() {
        let a = widget("a", 0.0, 0.0, 300.0, 200.0).without_layout();
        let b = widget("b", 0.0, 0.0, 300.0, 200.0).disabled();
        let c = widget("c", 0.0, 0.0, 300.0, 200.0);
        let stacks = compute_stacks(&[&a, &b, &c], &CanvasConfig::default());
        assert_eq!(stacks.len(), 1);
        assert_eq!(ids(&stacks[0]), vec!["c"]);
    }

    #[test]
    fn test_stack_of() {
        let a = widget("a", 0.0, 0.0, 300.0, 200.0);
        let b = widget("b", 4.0, 4.0, 300.0, 200.0);
        let stacks = compute_stacks(&[&a, &b], &CanvasConfig::default());
        let found = stack_of(&stacks, &WidgetId::new("b")).expect("b is placed");
        assert_eq!(found.group_id.as_str(), "a|b");
        assert!(stack_of(&stacks, &WidgetId::new("zzz")).is_none());
    }
}
