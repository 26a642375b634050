//! Text resolution over CHILD relationships

use fxhash::FxHashSet;

use super::{BlockGraph, BlockType, RelationshipKind};
use crate::utils::error::{ExtractionError, ExtractionResult};

/// Resolve the text of a block by following its CHILD relationships down to
/// WORD blocks.
///
/// Missing ids resolve to `""`. A child already on the current path resolves
/// to `""` instead of being followed again, so cyclic graphs terminate.
/// Traversal keeps its own stack, so chain depth is bounded by memory only.
pub fn resolve_text(graph: &BlockGraph, id: &str) -> String {
    resolve(graph, id, OnCycle::Skip).unwrap_or_default()
}

/// Strict variant of [`resolve_text`] that reports the first revisited block
/// as `CycleDetected` instead of degrading to empty text.
pub fn try_resolve_text(graph: &BlockGraph, id: &str) -> ExtractionResult<String> {
    resolve(graph, id, OnCycle::Fail)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OnCycle {
    Skip,
    Fail,
}

/// A non-word block whose children are being resolved
struct Frame<'g> {
    id: &'g str,
    children: Vec<&'g str>,
    next: usize,
    parts: Vec<String>,
}

enum Step<'g> {
    Text(String),
    Descend(Frame<'g>),
}

fn step<'g>(graph: &'g BlockGraph, id: &str) -> Step<'g> {
    let Some(block) = graph.get(id) else {
        return Step::Text(String::new());
    };

    if block.block_type == BlockType::Word {
        return Step::Text(block.text.clone().unwrap_or_default());
    }

    Step::Descend(Frame {
        id: block.id.as_str(),
        children: block.related_ids(RelationshipKind::Child).collect(),
        next: 0,
        parts: Vec::new(),
    })
}

fn resolve(graph: &BlockGraph, id: &str, on_cycle: OnCycle) -> ExtractionResult<String> {
    let mut path: FxHashSet<&str> = FxHashSet::default();
    let mut stack = match step(graph, id) {
        Step::Text(text) => return Ok(text),
        Step::Descend(frame) => {
            path.insert(frame.id);
            vec![frame]
        }
    };

    while let Some(frame) = stack.last_mut() {
        let next_child = frame.children.get(frame.next).copied();

        match next_child {
            Some(child) => {
                frame.next += 1;
                match step(graph, child) {
                    Step::Text(text) => {
                        if !text.is_empty() {
                            frame.parts.push(text);
                        }
                    }
                    Step::Descend(child_frame) => {
                        if path.contains(child_frame.id) {
                            if on_cycle == OnCycle::Fail {
                                return Err(ExtractionError::cycle(child_frame.id));
                            }
                            continue;
                        }
                        path.insert(child_frame.id);
                        stack.push(child_frame);
                    }
                }
            }
            None => {
                let Some(done) = stack.pop() else { break };
                path.remove(done.id);
                let text = done.parts.join(" ");

                match stack.last_mut() {
                    Some(parent) => {
                        if !text.is_empty() {
                            parent.parts.push(text);
                        }
                    }
                    None => return Ok(text),
                }
            }
        }
    }

    Ok(String::new())
}
