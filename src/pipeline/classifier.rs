use crate::constants::{
    name_matches_any, ATOMIC_MAX_DIMENSION, ATOMIC_NAME_PATTERNS, CATEGORY_RULES,
    SCREEN_MIN_DIMENSION, SCREEN_NAME_PATTERNS,
};
use crate::pipeline::walker::NodeVisit;
use crate::types::{
    Category, ComponentRecord, DocumentNode, NodeStyles, NodeType, ScreenRecord,
    SCREEN_RECORD_TYPE,
};

/// Outcome of classifying one visited node. Exactly one of the three holds
/// for every node; atomic takes precedence over screen, and an ignored node
/// still has its children visited by the walker.
#[derive(Debug)]
pub enum Classification {
    Component(ComponentRecord),
    Screen(ScreenRecord),
    Ignored,
}

/// Classify a single visited node. Pure function of the visit.
pub fn classify(visit: &NodeVisit<'_>) -> Classification {
    let node = visit.node;
    if is_atomic(node) {
        return Classification::Component(component_record(visit));
    }
    if is_screen(node) {
        return Classification::Screen(screen_record(node));
    }
    Classification::Ignored
}

/// Atomic predicate: a COMPONENT or INSTANCE that either carries a known
/// component keyword in its name or has both dimensions strictly below the
/// atomic threshold. Missing dimensions fail the size branch, never error.
fn is_atomic(node: &DocumentNode) -> bool {
    if !matches!(node.node_type, NodeType::Component | NodeType::Instance) {
        return false;
    }
    if name_matches_any(&node.name, &ATOMIC_NAME_PATTERNS) {
        return true;
    }
    match node.dimensions() {
        (Some(w), Some(h)) => w < ATOMIC_MAX_DIMENSION && h < ATOMIC_MAX_DIMENSION,
        _ => false,
    }
}

/// Screen predicate, only consulted when the atomic predicate failed: a
/// FRAME with a screen keyword in its name or at least one dimension at or
/// above the screen threshold.
fn is_screen(node: &DocumentNode) -> bool {
    if node.node_type != NodeType::Frame {
        return false;
    }
    if name_matches_any(&node.name, &SCREEN_NAME_PATTERNS) {
        return true;
    }
    let (width, height) = node.dimensions();
    width.map_or(false, |w| w >= SCREEN_MIN_DIMENSION)
        || height.map_or(false, |h| h >= SCREEN_MIN_DIMENSION)
}

/// Assign a category by walking the ordered rule table; first match wins.
pub fn category_for(name: &str) -> Category {
    let lower = name.to_lowercase();
    for (pattern, category) in CATEGORY_RULES.iter() {
        if lower.contains(pattern) {
            return *category;
        }
    }
    Category::Other
}

fn component_record(visit: &NodeVisit<'_>) -> ComponentRecord {
    let node = visit.node;
    let (width, height) = node.dimensions();
    let mut path = visit.path.clone();
    path.push(node.name.clone());

    ComponentRecord {
        name: node.name.clone(),
        id: node.id.clone(),
        path,
        node_type: node.node_type,
        category: category_for(&node.name),
        description: node.description.clone(),
        width,
        height,
        child_count: node.children.len(),
        styles: NodeStyles {
            background_color: node.background_color.clone(),
            opacity: node.opacity,
            effects: node.effects.clone(),
        },
    }
}

fn screen_record(node: &DocumentNode) -> ScreenRecord {
    let (width, height) = node.dimensions();
    ScreenRecord {
        name: node.name.clone(),
        id: node.id.clone(),
        record_type: SCREEN_RECORD_TYPE.to_string(),
        width,
        height,
    }
}
