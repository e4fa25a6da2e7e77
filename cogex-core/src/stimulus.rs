use serde::{Deserialize, Serialize};
use std::fmt;

/// The two tasks a trial can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Color,
    Shape,
}

impl Task {
    pub const ALL: [Task; 2] = [Task::Color, Task::Shape];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Color => "color",
            Task::Shape => "shape",
        }
    }

    /// Key the task assigns to a (shape, color) pair
    pub fn respond_to(&self, shape: Shape, color: StimulusColor) -> ResponseKey {
        match self {
            Task::Color => match color {
                StimulusColor::Yellow => ResponseKey::Left,
                StimulusColor::Blue => ResponseKey::Right,
            },
            Task::Shape => match shape {
                Shape::Circle => ResponseKey::Left,
                Shape::Rectangle => ResponseKey::Right,
            },
        }
    }

    pub fn other(&self) -> Task {
        match self {
            Task::Color => Task::Shape,
            Task::Shape => Task::Color,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Rectangle,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Rectangle => "rectangle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusColor {
    Yellow,
    Blue,
}

impl StimulusColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            StimulusColor::Yellow => "yellow",
            StimulusColor::Blue => "blue",
        }
    }
}

/// Logical response, bound to one of two physical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKey {
    #[serde(rename = "b")]
    Left,
    #[serde(rename = "n")]
    Right,
}

impl ResponseKey {
    pub const LEFT_CHAR: char = 'b';
    pub const RIGHT_CHAR: char = 'n';

    pub fn physical(&self) -> char {
        match self {
            ResponseKey::Left => Self::LEFT_CHAR,
            ResponseKey::Right => Self::RIGHT_CHAR,
        }
    }

    /// Physical key as written to the trial log
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKey::Left => "b",
            ResponseKey::Right => "n",
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            Self::LEFT_CHAR => Some(ResponseKey::Left),
            Self::RIGHT_CHAR => Some(ResponseKey::Right),
            _ => None,
        }
    }
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StimulusDefinition {
    pub name: &'static str,
    pub shape: Shape,
    pub color: StimulusColor,
    pub correct_key: ResponseKey,
    pub congruent: bool,
}

impl StimulusDefinition {
    const fn new(
        name: &'static str,
        shape: Shape,
        color: StimulusColor,
        correct_key: ResponseKey,
        congruent: bool,
    ) -> Self {
        Self {
            name,
            shape,
            color,
            correct_key,
            congruent,
        }
    }
}

pub static COLOR_TASK_STIMULI: [StimulusDefinition; 4] = [
    StimulusDefinition::new(
        "color congruent 1 left",
        Shape::Circle,
        StimulusColor::Yellow,
        ResponseKey::Left,
        true,
    ),
    StimulusDefinition::new(
        "color incongruent 2 left",
        Shape::Rectangle,
        StimulusColor::Yellow,
        ResponseKey::Left,
        false,
    ),
    StimulusDefinition::new(
        "color incongruent 2 right",
        Shape::Circle,
        StimulusColor::Blue,
        ResponseKey::Right,
        false,
    ),
    StimulusDefinition::new(
        "color congruent 1 right",
        Shape::Rectangle,
        StimulusColor::Blue,
        ResponseKey::Right,
        true,
    ),
];

pub static SHAPE_TASK_STIMULI: [StimulusDefinition; 4] = [
    StimulusDefinition::new(
        "shape congruent 1 left",
        Shape::Circle,
        StimulusColor::Yellow,
        ResponseKey::Left,
        true,
    ),
    StimulusDefinition::new(
        "shape incongruent 2 right",
        Shape::Rectangle,
        StimulusColor::Yellow,
        ResponseKey::Right,
        false,
    ),
    StimulusDefinition::new(
        "shape incongruent 2 left",
        Shape::Circle,
        StimulusColor::Blue,
        ResponseKey::Left,
        false,
    ),
    StimulusDefinition::new(
        "shape congruent 1 right",
        Shape::Rectangle,
        StimulusColor::Blue,
        ResponseKey::Right,
        true,
    ),
];

/// Stimulus set for a task
pub fn catalog(task: Task) -> &'static [StimulusDefinition; 4] {
    match task {
        Task::Color => &COLOR_TASK_STIMULI,
        Task::Shape => &SHAPE_TASK_STIMULI,
    }
}

pub fn correct_key(task: Task, shape: Shape, color: StimulusColor) -> ResponseKey {
    task.respond_to(shape, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn each_catalog_has_two_congruent_entries() {
        for task in Task::ALL {
            let congruent = catalog(task).iter().filter(|s| s.congruent).count();
            assert_eq!(congruent, 2, "{task}");
        }
    }

    #[test]
    fn each_catalog_covers_every_shape_color_pair_once() {
        for task in Task::ALL {
            let pairs: HashSet<_> = catalog(task).iter().map(|s| (s.shape, s.color)).collect();
            assert_eq!(pairs.len(), 4, "{task}");
        }
    }

    #[test]
    fn correct_key_follows_the_task_mapping() {
        for task in Task::ALL {
            for stim in catalog(task) {
                assert_eq!(correct_key(task, stim.shape, stim.color), stim.correct_key);
            }
        }
    }

    #[test]
    fn congruent_means_both_tasks_agree() {
        for task in Task::ALL {
            for stim in catalog(task) {
                let other = task.other().respond_to(stim.shape, stim.color);
                assert_eq!(stim.congruent, other == stim.correct_key, "{}", stim.name);
            }
        }
    }

    #[test]
    fn response_keys_are_case_insensitive() {
        assert_eq!(ResponseKey::from_char('B'), Some(ResponseKey::Left));
        assert_eq!(ResponseKey::from_char('n'), Some(ResponseKey::Right));
        assert_eq!(ResponseKey::from_char('q'), None);
    }
}
