//! Shaping of the segmentation poll before it is sent remotely.

use serde::{Deserialize, Serialize};

use crate::types::{AnswerNode, PollQuestion};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOptionPayload {
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollQuestionPayload {
    pub text: String,
    pub options: Vec<PollOptionPayload>,
}

/// Answer tree node in flat (parent-linked) form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatAnswerNode {
    pub node_id: String,
    pub parent_node_id: String,
    pub label: String,
    pub value: String,
}

fn is_kept_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || ('а'..='я').contains(&c) || c == 'ё'
}

/// Machine value for a poll option.
///
/// Trimmed, lowercased, whitespace runs become `_`, anything outside
/// `[a-z0-9а-яё_]` is dropped. An empty result falls back to
/// `q{question}_opt{option}` (1-based).
pub fn normalize_option_value(text: &str, q_index: usize, opt_index: usize) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        if is_kept_char(c) {
            out.push(c);
        }
    }
    if out.is_empty() {
        format!("q{}_opt{}", q_index + 1, opt_index + 1)
    } else {
        out
    }
}

/// Drop blank questions and options; questions left without options go too.
///
/// Indices used for fallback values count the surviving questions/options.
pub fn build_poll_questions(questions: &[PollQuestion]) -> Vec<PollQuestionPayload> {
    questions
        .iter()
        .filter(|q| !q.question.trim().is_empty())
        .enumerate()
        .map(|(q_index, q)| PollQuestionPayload {
            text: q.question.clone(),
            options: q
                .options
                .iter()
                .filter(|o| !o.trim().is_empty())
                .enumerate()
                .map(|(opt_index, o)| PollOptionPayload {
                    text: o.clone(),
                    value: normalize_option_value(o, q_index, opt_index),
                })
                .collect(),
        })
        .filter(|q| !q.options.is_empty())
        .collect()
}

/// Pre-order flattening with path-derived ids (`root-1`, `root-1-2`, ...).
pub fn flatten_answer_tree(nodes: &[AnswerNode]) -> Vec<FlatAnswerNode> {
    let mut flat = Vec::new();
    walk(nodes, "", "root", &mut flat);
    flat
}

fn walk(nodes: &[AnswerNode], parent: &str, path: &str, flat: &mut Vec<FlatAnswerNode>) {
    for (index, node) in nodes.iter().enumerate() {
        let node_id = format!("{path}-{}", index + 1);
        let label = if node.label.is_empty() {
            format!("Node {}", index + 1)
        } else {
            node.label.clone()
        };
        let value = if node.value.is_empty() {
            format!("node_{}", index + 1)
        } else {
            node.value.clone()
        };
        flat.push(FlatAnswerNode {
            node_id: node_id.clone(),
            parent_node_id: parent.to_string(),
            label,
            value,
        });
        if !node.next.is_empty() {
            walk(&node.next, &node_id, &node_id, flat);
        }
    }
}
