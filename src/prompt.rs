//! Prompting interface for choosing the step type to convert.
//!
//! An object implementing [`StepTypePrompter`] is taken by
//! [`crate::convert::StepToTap::convert_with_prompter`]. Interactive front ends list the choices
//! and read an answer here, while [`FirstAvailable`] and [`Fixed`] cover unattended use.

use crate::sm::step_type::StepType;

/// An interface to choose one of the step types found in a chart.
pub trait StepTypePrompter {
    /// Chooses a step type from `available`, or `None` to abort.
    fn choose(&mut self, available: &[StepType]) -> Option<StepType>;
}

/// Chooses the first step type of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FirstAvailable;

impl StepTypePrompter for FirstAvailable {
    fn choose(&mut self, available: &[StepType]) -> Option<StepType> {
        available.first().cloned()
    }
}

/// Always answers the same step type, whether the chart has it or not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fixed(pub StepType);

impl StepTypePrompter for Fixed {
    fn choose(&mut self, _: &[StepType]) -> Option<StepType> {
        Some(self.0.clone())
    }
}

impl<F> StepTypePrompter for F
where
    F: FnMut(&[StepType]) -> Option<StepType>,
{
    fn choose(&mut self, available: &[StepType]) -> Option<StepType> {
        self(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompters() {
        let available = [StepType::from("dance-single-easy"), StepType::from("dance-single-hard")];
        assert_eq!(FirstAvailable.choose(&available), available.first().cloned());
        assert_eq!(FirstAvailable.choose(&[]), None);
        assert_eq!(
            Fixed("pump-single-hard".into()).choose(&available),
            Some(StepType::from("pump-single-hard"))
        );
        let mut last = |types: &[StepType]| types.last().cloned();
        assert_eq!(last.choose(&available), available.last().cloned());
    }
}
