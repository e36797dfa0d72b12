//! Runtime armatures, slots and display candidates.

use std::rc::Rc;

use crate::data::{ActionDefinition, ArmatureDefinition, AtlasRegion, DisplayDefinition, SlotDefinition};
use crate::ids::{ArmatureId, AtlasId, ContainerId};

/// A resolved atlas region plus the atlas that owns its material.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureRef {
    pub atlas: AtlasId,
    pub region: AtlasRegion,
}

/// One interchangeable display of a slot.
#[derive(Clone, Debug)]
pub enum DisplayCandidate {
    Image {
        display: Rc<DisplayDefinition>,
        /// `None` when no loaded atlas has the region.
        texture: Option<TextureRef>,
    },
    /// Skinning metadata is reachable through `display.kind`.
    Mesh {
        display: Rc<DisplayDefinition>,
        texture: Option<TextureRef>,
    },
    NestedArmature {
        child: ArmatureId,
    },
    Absent,
}

impl DisplayCandidate {
    pub fn display(&self) -> Option<&Rc<DisplayDefinition>> {
        match self {
            DisplayCandidate::Image { display, .. } | DisplayCandidate::Mesh { display, .. } => {
                Some(display)
            }
            _ => None,
        }
    }

    pub fn texture(&self) -> Option<&TextureRef> {
        match self {
            DisplayCandidate::Image { texture, .. } | DisplayCandidate::Mesh { texture, .. } => {
                texture.as_ref()
            }
            _ => None,
        }
    }

    pub fn child(&self) -> Option<ArmatureId> {
        match self {
            DisplayCandidate::NestedArmature { child } => Some(*child),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, DisplayCandidate::Absent)
    }
}

/// Named attachment point with at most one active display.
#[derive(Debug)]
pub struct Slot {
    pub name: String,
    /// Owning bone.
    pub bone: String,
    pub container: ContainerId,
    default_index: i32,
    displays: Vec<DisplayCandidate>,
    active: Option<usize>,
}

impl Slot {
    pub(crate) fn new(def: &SlotDefinition, container: ContainerId) -> Self {
        Self {
            name: def.name.clone(),
            bone: def.parent.clone(),
            container,
            default_index: def.display_index,
            displays: Vec::new(),
            active: None,
        }
    }

    pub fn displays(&self) -> &[DisplayCandidate] {
        &self.displays
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_display(&self) -> Option<&DisplayCandidate> {
        self.active.and_then(|i| self.displays.get(i))
    }

    /// Nested armatures held by this slot, in candidate order.
    pub fn nested_children(&self) -> impl Iterator<Item = ArmatureId> + '_ {
        self.displays.iter().filter_map(DisplayCandidate::child)
    }

    /// Replace the whole candidate list at once. The active index survives if
    /// it is still in range; otherwise the definition's index is used when
    /// valid, else 0. An empty list has no active index.
    pub(crate) fn install(&mut self, displays: Vec<DisplayCandidate>) {
        let len = displays.len();
        self.displays = displays;
        self.active = match self.active {
            Some(i) if i < len => Some(i),
            _ if len == 0 => None,
            _ => {
                let wanted = usize::try_from(self.default_index).ok();
                Some(wanted.filter(|i| *i < len).unwrap_or(0))
            }
        };
    }

    /// Put `candidate` at `index`, leaving the other candidates and the active
    /// index untouched. The list grows with `Absent` entries when `index` is
    /// past its end. Returns the candidate previously at `index`.
    pub(crate) fn place_at(&mut self, index: usize, candidate: DisplayCandidate) -> DisplayCandidate {
        if index >= self.displays.len() {
            self.displays.resize(index + 1, DisplayCandidate::Absent);
        }
        std::mem::replace(&mut self.displays[index], candidate)
    }

    /// Turn every candidate pointing at `child` into `Absent`.
    pub(crate) fn forget_child(&mut self, child: ArmatureId) -> bool {
        let mut found = false;
        for candidate in &mut self.displays {
            if candidate.child() == Some(child) {
                *candidate = DisplayCandidate::Absent;
                found = true;
            }
        }
        found
    }

    /// Set the active index; `None` deactivates the slot. Out-of-range
    /// indices are rejected and leave the slot unchanged.
    pub(crate) fn set_active(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) if i >= self.displays.len() => false,
            _ => {
                self.active = index;
                true
            }
        }
    }
}

/// Local animation request queued for the evaluator.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationCommand {
    /// Play the named animation, or the default one when `None`.
    Play { animation: Option<String> },
    /// Replay of a definition's entry action.
    Action(ActionDefinition),
}

/// A live armature instance bound to a host container.
#[derive(Debug)]
pub struct Armature {
    pub id: ArmatureId,
    pub name: String,
    /// Dataset the definition was resolved from.
    pub dataset: String,
    pub definition: Rc<ArmatureDefinition>,
    pub skin: String,
    /// Atlas dataset override used for region lookups, if any.
    pub atlas_dataset: Option<String>,
    pub container: ContainerId,
    /// False when the container was supplied by the caller.
    pub owns_container: bool,
    pub ui_mode: bool,
    pub inherit_animation: bool,
    pub parent: Option<ArmatureId>,
    pub slots: Vec<Slot>,
    /// Seconds advanced by the clock since build.
    pub time: f32,
    commands: Vec<AnimationCommand>,
}

impl Armature {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ArmatureId,
        dataset: String,
        definition: Rc<ArmatureDefinition>,
        skin: String,
        atlas_dataset: Option<String>,
        container: ContainerId,
        owns_container: bool,
        ui_mode: bool,
        parent: Option<ArmatureId>,
    ) -> Self {
        Self {
            id,
            name: definition.name.clone(),
            dataset,
            definition,
            skin,
            atlas_dataset,
            container,
            owns_container,
            ui_mode,
            inherit_animation: true,
            parent,
            slots: Vec::new(),
            time: 0.0,
            commands: Vec::new(),
        }
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }

    /// Every nested armature referenced by any slot.
    pub fn child_armatures(&self) -> Vec<ArmatureId> {
        self.slots.iter().flat_map(Slot::nested_children).collect()
    }

    /// Atlases behind every textured candidate of every slot.
    pub fn referenced_atlases(&self) -> Vec<AtlasId> {
        self.slots
            .iter()
            .flat_map(|s| s.displays().iter().filter_map(|d| d.texture().map(|t| t.atlas)))
            .collect()
    }

    /// Queue a local animation; `None` plays the default animation.
    pub fn play(&mut self, animation: Option<&str>) {
        self.commands.push(AnimationCommand::Play {
            animation: animation.map(str::to_string),
        });
    }

    pub(crate) fn buffer_action(&mut self, action: ActionDefinition) {
        self.commands.push(AnimationCommand::Action(action));
    }

    pub fn pending_commands(&self) -> &[AnimationCommand] {
        &self.commands
    }

    /// Hand queued commands to the evaluator.
    pub fn take_commands(&mut self) -> Vec<AnimationCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// Live armatures owned by a context.
#[derive(Debug, Default)]
pub struct ArmatureStore {
    items: Vec<Armature>,
}

impl ArmatureStore {
    pub fn get(&self, id: ArmatureId) -> Option<&Armature> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: ArmatureId) -> Option<&mut Armature> {
        self.items.iter_mut().find(|a| a.id == id)
    }

    pub(crate) fn insert(&mut self, armature: Armature) {
        self.items.push(armature);
    }

    pub(crate) fn remove(&mut self, id: ArmatureId) -> Option<Armature> {
        let idx = self.items.iter().position(|a| a.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Armature> {
        self.items.iter()
    }

    pub fn ids(&self) -> Vec<ArmatureId> {
        self.items.iter().map(|a| a.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
