//! Per-frame time-advance registry over live armatures.

use crate::armature::ArmatureStore;
use crate::host::AnimationEvaluator;
use crate::ids::ArmatureId;

#[derive(Debug)]
pub struct Clock {
    armatures: Vec<ArmatureId>,
    /// Multiplier applied to every delta before it reaches armatures.
    pub time_scale: f32,
    /// Scaled seconds advanced so far.
    time: f32,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            armatures: Vec::new(),
            time_scale: 1.0,
            time: 0.0,
        }
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an armature; registering twice is a no-op.
    pub fn add(&mut self, armature: ArmatureId) {
        if !self.armatures.contains(&armature) {
            self.armatures.push(armature);
        }
    }

    pub fn remove(&mut self, armature: ArmatureId) -> bool {
        let before = self.armatures.len();
        self.armatures.retain(|a| *a != armature);
        before != self.armatures.len()
    }

    pub fn contains(&self, armature: ArmatureId) -> bool {
        self.armatures.contains(&armature)
    }

    pub fn registered(&self) -> &[ArmatureId] {
        &self.armatures
    }

    pub fn len(&self) -> usize {
        self.armatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armatures.is_empty()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Forward one tick to every registered armature. Armatures are
    /// independent, so no ordering between them is promised.
    pub fn advance_time(
        &mut self,
        dt: f32,
        store: &mut ArmatureStore,
        evaluator: &mut dyn AnimationEvaluator,
    ) {
        let scaled = dt * self.time_scale;
        self.time += scaled;
        for id in &self.armatures {
            if let Some(armature) = store.get_mut(*id) {
                armature.time += scaled;
                evaluator.advance_time(armature, scaled);
            }
        }
    }

    pub fn clear(&mut self) {
        self.armatures.clear();
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut clock = Clock::new();
        clock.add(ArmatureId(3));
        clock.add(ArmatureId(3));
        assert_eq!(clock.len(), 1);
        assert!(clock.remove(ArmatureId(3)));
        assert!(!clock.remove(ArmatureId(3)));
        assert!(clock.is_empty());
    }
}
