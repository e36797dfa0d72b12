mod common;

use armature_factory_core::{
    ArmatureId, BuildRequest, DisplayCandidate, DisplayKind, DisplayReplacement, FactoryContext,
    ImageInfo, MaterialHandle,
};
use common::{load_dragon, load_stable, TestHost};

fn portrait() -> ImageInfo {
    ImageInfo {
        identity: "portrait".into(),
        asset_path: "Assets/Art/portrait.png".into(),
        width: 40,
        height: 24,
    }
}

fn replacement(target: ArmatureId, slot: &str, display: &str) -> DisplayReplacement {
    DisplayReplacement {
        dataset: "Dragon".into(),
        definition: "DragonArmature".into(),
        slot: slot.into(),
        display: display.into(),
        target,
        target_slot: slot.into(),
        image: portrait(),
        material: MaterialHandle(77),
        ui_mode: false,
        display_index: None,
    }
}

fn dragon(ctx: &mut FactoryContext, th: &mut TestHost) -> ArmatureId {
    load_dragon(ctx, th);
    ctx.build(&BuildRequest::new("DragonArmature"), &mut th.host())
        .expect("build")
        .expect("resolved")
}

#[test]
fn replacement_keeps_transform_and_pivot() {
    let mut th = TestHost::new();
    let mut ctx = FactoryContext::default();
    let id = dragon(&mut ctx, &mut th);
    let before = ctx
        .armature(id)
        .and_then(|a| a.slot("body"))
        .and_then(|s| s.displays()[0].display().cloned())
        .expect("body display");

    assert!(ctx.replace_slot_display(&replacement(id, "body", "body_0"), &mut th.materials));

    let slot = ctx
        .armature(id)
        .and_then(|a| a.slot("body"))
        .expect("body slot");
    assert_eq!(slot.displays().len(), 1);
    assert_eq!(slot.active_index(), Some(0));
    let candidate = &slot.displays()[0];
    let display = candidate.display().expect("image display");
    assert_eq!(display.transform, before.transform);
    assert_eq!(display.pivot, before.pivot);
    assert_eq!(display.transform.scale_x.to_bits(), before.transform.scale_x.to_bits());
    assert_eq!(display.name, "body_0");
    assert!(matches!(candidate, DisplayCandidate::Image { .. }));

    let texture = candidate.texture().expect("texture");
    assert_eq!(texture.region.name, "body_0");
    assert_eq!(texture.region.rect(), (0.0, 0.0, 40.0, 24.0));
    assert!(!texture.region.rotated);

    let atlas = ctx.atlas(texture.atlas).expect("synthetic atlas");
    assert!(atlas.synthetic);
    assert_eq!(atlas.material, Some(MaterialHandle(77)));
    assert_eq!(atlas.ui_material, None);
    assert_eq!((atlas.width, atlas.height), (40, 24));
    assert_eq!(th.materials.textures, vec![(MaterialHandle(77), "portrait".to_string())]);

    // Synthetic atlases never shadow dataset regions.
    let cached = ctx
        .atlases()
        .find_texture("Dragon", "body_0")
        .expect("dataset region");
    assert_eq!(cached.region.rect(), (0.0, 0.0, 64.0, 64.0));
}

#[test]
fn mesh_replacement_keeps_skinning_and_neighbours() {
    let mut th = TestHost::new();
    let mut ctx = FactoryContext::default();
    let id = dragon(&mut ctx, &mut th);

    let mut req = replacement(id, "wing", "wing_mesh");
    req.display_index = Some(2);
    req.ui_mode = true;
    assert!(ctx.replace_slot_display(&req, &mut th.materials));

    let slot = ctx
        .armature(id)
        .and_then(|a| a.slot("wing"))
        .expect("wing slot");
    assert_eq!(slot.displays().len(), 3);
    assert_eq!(slot.active_index(), Some(1));
    assert_eq!(
        slot.displays()[0].texture().map(|t| t.region.name.as_str()),
        Some("wing_0")
    );
    match &slot.displays()[2] {
        DisplayCandidate::Mesh { display, texture } => {
            match &display.kind {
                DisplayKind::Mesh(mesh) => {
                    assert_eq!(mesh.triangles, vec![0, 1, 2]);
                    assert_eq!(mesh.weights.as_deref(), Some(&[1.0, 0.0, 1.0][..]));
                }
                other => panic!("expected mesh kind, got {other:?}"),
            }
            let atlas = texture
                .as_ref()
                .and_then(|t| ctx.atlas(t.atlas))
                .expect("synthetic atlas");
            assert_eq!(atlas.ui_material, Some(MaterialHandle(77)));
            assert_eq!(atlas.material, None);
        }
        other => panic!("expected mesh candidate, got {other:?}"),
    }
}

#[test]
fn index_past_the_end_extends_the_list() {
    let mut th = TestHost::new();
    let mut ctx = FactoryContext::default();
    let id = dragon(&mut ctx, &mut th);

    let mut req = replacement(id, "body", "body_0");
    req.display_index = Some(2);
    assert!(ctx.replace_slot_display(&req, &mut th.materials));

    let slot = ctx
        .armature(id)
        .and_then(|a| a.slot("body"))
        .expect("body slot");
    assert_eq!(slot.displays().len(), 3);
    assert!(slot.displays()[1].is_absent());
    assert!(slot.displays()[2].texture().is_some());
    assert_eq!(slot.active_index(), Some(0));
}

#[test]
fn unknown_or_untextured_sources_are_rejected() {
    let mut th = TestHost::new();
    let mut ctx = FactoryContext::default();
    let id = dragon(&mut ctx, &mut th);
    load_stable(&mut ctx, &mut th);
    let atlases_before = ctx.atlases().len();

    assert!(!ctx.replace_slot_display(&replacement(id, "body", "nope"), &mut th.materials));

    let mut armature_source = replacement(id, "mount", "Mount");
    armature_source.dataset = "Stable".into();
    armature_source.definition = "Rider".into();
    armature_source.target_slot = "body".into();
    assert!(!ctx.replace_slot_display(&armature_source, &mut th.materials));

    let mut wrong_target = replacement(id, "body", "body_0");
    wrong_target.target_slot = "tail".into();
    assert!(!ctx.replace_slot_display(&wrong_target, &mut th.materials));

    assert_eq!(ctx.atlases().len(), atlases_before);
    assert!(th.materials.textures.is_empty());
}

#[test]
fn inactive_slot_without_index_is_left_alone() {
    let mut th = TestHost::new();
    let mut ctx = FactoryContext::default();
    let id = dragon(&mut ctx, &mut th);
    assert!(ctx.set_slot_display_index(id, "body", None, &mut th.scene));

    assert!(!ctx.replace_slot_display(&replacement(id, "body", "body_0"), &mut th.materials));

    let mut explicit = replacement(id, "body", "body_0");
    explicit.display_index = Some(0);
    assert!(ctx.replace_slot_display(&explicit, &mut th.materials));
}

#[test]
fn replacing_a_nested_child_disposes_it() {
    let mut th = TestHost::new();
    let mut ctx = FactoryContext::default();
    load_stable(&mut ctx, &mut th);
    let rider = ctx
        .build(&BuildRequest::new("Rider"), &mut th.host())
        .expect("build")
        .expect("resolved");
    let mount = ctx
        .armature(rider)
        .and_then(|a| a.slot("mount"))
        .and_then(|s| s.active_display())
        .and_then(DisplayCandidate::child)
        .expect("mount child");

    let req = DisplayReplacement {
        dataset: "Stable".into(),
        definition: "Rider".into(),
        slot: "mount".into(),
        display: "saddle".into(),
        target: rider,
        target_slot: "mount".into(),
        image: portrait(),
        material: MaterialHandle(5),
        ui_mode: false,
        display_index: None,
    };
    assert!(ctx.replace_slot_display(&req, &mut th.materials));

    assert!(ctx.armature(mount).is_none());
    assert!(!ctx.clock().contains(mount));
    assert_eq!(ctx.clock().len(), 3);
    let slot = ctx
        .armature(rider)
        .and_then(|a| a.slot("mount"))
        .expect("mount slot");
    assert!(matches!(slot.displays()[0], DisplayCandidate::Image { .. }));
}

#[test]
fn repeated_replacements_keep_one_synthetic_atlas_until_dispose() {
    let mut th = TestHost::new();
    let mut ctx = FactoryContext::default();
    let id = dragon(&mut ctx, &mut th);
    let baseline = ctx.atlases().len();

    for _ in 0..5 {
        assert!(ctx.replace_slot_display(&replacement(id, "body", "body_0"), &mut th.materials));
    }
    assert_eq!(ctx.atlases().len(), baseline + 1);

    let current = ctx
        .armature(id)
        .and_then(|a| a.slot("body"))
        .and_then(|s| s.displays()[0].texture())
        .map(|t| t.atlas)
        .expect("replacement texture");
    assert!(ctx.atlas(current).expect("live atlas").synthetic);

    ctx.dispose(id);
    assert_eq!(ctx.atlases().len(), baseline);
    assert!(ctx.atlas(current).is_none());
    assert!(ctx.atlases().lookup("Dragon", "Dragon_tex").is_some());
}
