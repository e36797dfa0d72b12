#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;

use armature_factory_core::{
    AnimationCommand, AnimationEvaluator, Armature, ArmatureDefinition, ArmatureId,
    AssetPersistence, AtlasSource, ContainerId, DataBundle, FactoryContext, Host, HostScene,
    ImageInfo, MaterialFactory, MaterialHandle, ResourceProvider, SkeletonDefinition,
};
use armature_test_fixtures::{atlases, skeletons};

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerNode {
    pub id: ContainerId,
    pub name: String,
    pub parent: Option<ContainerId>,
    pub visible: bool,
}

/// Flat in-memory scene graph.
#[derive(Debug, Default)]
pub struct MemoryScene {
    pub nodes: Vec<ContainerNode>,
    next: u64,
}

impl MemoryScene {
    pub fn node(&self, id: ContainerId) -> &ContainerNode {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .expect("container exists")
    }

    pub fn named(&self, name: &str) -> Vec<&ContainerNode> {
        self.nodes.iter().filter(|n| n.name == name).collect()
    }

    pub fn is_visible(&self, id: ContainerId) -> bool {
        self.node(id).visible
    }

    /// Create a named child ahead of a build, as an editor would.
    pub fn prewire(&mut self, parent: ContainerId, name: &str) -> ContainerId {
        let id = self.create_container(name);
        self.attach(id, parent);
        id
    }

    fn node_mut(&mut self, id: ContainerId) -> &mut ContainerNode {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .expect("container exists")
    }
}

impl HostScene for MemoryScene {
    fn create_container(&mut self, name: &str) -> ContainerId {
        self.next += 1;
        let id = ContainerId(self.next);
        self.nodes.push(ContainerNode {
            id,
            name: name.to_string(),
            parent: None,
            visible: true,
        });
        id
    }

    fn find_container(&self, parent: ContainerId, name: &str) -> Option<ContainerId> {
        self.nodes
            .iter()
            .find(|n| n.parent == Some(parent) && n.name == name)
            .map(|n| n.id)
    }

    fn attach(&mut self, child: ContainerId, parent: ContainerId) {
        self.node_mut(child).parent = Some(parent);
    }

    fn hide(&mut self, container: ContainerId) {
        self.node_mut(container).visible = false;
    }

    fn show(&mut self, container: ContainerId) {
        self.node_mut(container).visible = true;
    }
}

#[derive(Debug, Default)]
pub struct MemoryResources {
    pub images: HashMap<String, ImageInfo>,
    pub lookups: Vec<String>,
}

impl MemoryResources {
    /// Images backing every fixture atlas.
    pub fn with_fixture_images() -> Self {
        let mut resources = Self::default();
        for key in ["dragon", "stable"] {
            let image = atlases::image(key).expect("fixture image");
            resources.add(&image.identity, image.width, image.height);
        }
        resources
    }

    pub fn add(&mut self, identity: &str, width: u32, height: u32) {
        self.images.insert(
            identity.to_string(),
            ImageInfo {
                identity: identity.to_string(),
                asset_path: format!("Assets/Art/{identity}.png"),
                width,
                height,
            },
        );
    }
}

impl ResourceProvider for MemoryResources {
    fn locate_image(&mut self, identity: &str) -> Option<ImageInfo> {
        self.lookups.push(identity.to_string());
        self.images.get(identity).cloned()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreatedMaterial {
    pub handle: MaterialHandle,
    pub shader: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Default)]
pub struct MemoryMaterials {
    pub created: Vec<CreatedMaterial>,
    pub named: HashMap<String, MaterialHandle>,
    /// (material, image identity) per `set_main_texture` call.
    pub textures: Vec<(MaterialHandle, String)>,
    next: u64,
}

impl MemoryMaterials {
    pub fn mint(&mut self) -> MaterialHandle {
        self.next += 1;
        MaterialHandle(1000 + self.next)
    }
}

impl MaterialFactory for MemoryMaterials {
    fn find_material(&mut self, name: &str) -> Option<MaterialHandle> {
        self.named.get(name).copied()
    }

    fn create_material(&mut self, shader: &str, image: &ImageInfo, name: &str) -> MaterialHandle {
        let handle = self.mint();
        self.created.push(CreatedMaterial {
            handle,
            shader: shader.to_string(),
            name: name.to_string(),
            image: image.identity.clone(),
        });
        self.named.insert(name.to_string(), handle);
        handle
    }

    fn set_main_texture(&mut self, material: MaterialHandle, image: &ImageInfo) {
        self.textures.push((material, image.identity.clone()));
    }
}

/// Records hook calls; drains queued commands on every tick.
#[derive(Debug, Default)]
pub struct RecordingEvaluator {
    pub inits: Vec<(ArmatureId, String)>,
    /// (armature, inherit_animation, pending command count) seen at `init`.
    pub init_states: Vec<(ArmatureId, bool, usize)>,
    pub ticks: Vec<(ArmatureId, f32)>,
    pub commands: Vec<(ArmatureId, AnimationCommand)>,
}

impl RecordingEvaluator {
    pub fn ticks_for(&self, id: ArmatureId) -> Vec<f32> {
        self.ticks
            .iter()
            .filter(|(a, _)| *a == id)
            .map(|(_, dt)| *dt)
            .collect()
    }
}

impl AnimationEvaluator for RecordingEvaluator {
    fn init(&mut self, armature: &Armature, definition: &ArmatureDefinition) {
        self.inits.push((armature.id, definition.name.clone()));
        self.init_states.push((
            armature.id,
            armature.inherit_animation,
            armature.pending_commands().len(),
        ));
    }

    fn advance_time(&mut self, armature: &mut Armature, dt: f32) {
        self.ticks.push((armature.id, dt));
        for command in armature.take_commands() {
            self.commands.push((armature.id, command));
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    pub saved: Vec<(MaterialHandle, String)>,
    pub modified: Vec<String>,
}

impl AssetPersistence for MemoryPersistence {
    fn save_material(&mut self, material: MaterialHandle, path: &str) {
        self.saved.push((material, path.to_string()));
    }

    fn mark_modified(&mut self, dataset: &str) {
        self.modified.push(dataset.to_string());
    }
}

/// Every host double in one place; hands out `Host` bundles per call.
pub struct TestHost {
    pub scene: MemoryScene,
    pub resources: MemoryResources,
    pub materials: MemoryMaterials,
    pub evaluator: RecordingEvaluator,
    pub persistence: MemoryPersistence,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            scene: MemoryScene::default(),
            resources: MemoryResources::with_fixture_images(),
            materials: MemoryMaterials::default(),
            evaluator: RecordingEvaluator::default(),
            persistence: MemoryPersistence::default(),
        }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host::new(
            &mut self.scene,
            &mut self.resources,
            &mut self.materials,
            &mut self.evaluator,
        )
    }

    /// Host bundle for an authoring context.
    pub fn authoring(&mut self) -> Host<'_> {
        Host::new(
            &mut self.scene,
            &mut self.resources,
            &mut self.materials,
            &mut self.evaluator,
        )
        .with_persistence(&mut self.persistence)
    }
}

pub fn bundle(skeleton: &str, atlas: &str) -> DataBundle {
    DataBundle {
        name: None,
        skeleton: skeletons::document(skeleton).expect("skeleton fixture"),
        atlases: vec![AtlasSource::new(
            atlases::document(atlas).expect("atlas fixture"),
        )],
    }
}

pub fn load_dragon(ctx: &mut FactoryContext, th: &mut TestHost) -> Rc<SkeletonDefinition> {
    ctx.load_data(&bundle("dragon", "dragon"), false, 0.0, &mut th.host())
        .expect("load Dragon")
}

pub fn load_stable(ctx: &mut FactoryContext, th: &mut TestHost) -> Rc<SkeletonDefinition> {
    ctx.load_data(&bundle("stable", "stable"), false, 0.0, &mut th.host())
        .expect("load Stable")
}
