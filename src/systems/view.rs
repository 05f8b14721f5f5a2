// draws the focused settlement and hosts the control panel
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};

use crate::systems::export::ExportEvent;
use crate::systems::settlement::poly::mesh_gen::extrude_footprint;
use crate::systems::settlement::{
    demo_site, BuildingKind, SettlementCache, SettlementFocusEvent, SettlementId, SettlementKind,
    SettlementReadyEvent, SettlementSite, StreetKind, WorldSeed,
};

#[derive(Resource)]
pub struct ViewState {
    pub site: SettlementSite,
    pub shown: Option<SettlementId>,
    pub next_id: u32,
    pub next_kind: SettlementKind,
}

// marker for everything spawned for the shown layout
#[derive(Component)]
pub struct SettlementMesh;

pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        assert!(app.is_plugin_added::<EguiPlugin>());
        let world_seed = app.world().get_resource::<WorldSeed>().map_or(crate::config::INITIAL_WORLD_SEED, |s| s.0);
        let site = demo_site(SettlementId(0), SettlementKind::Town, world_seed);

        app
            .insert_resource(ViewState {
                site,
                shown: None,
                next_id: 0,
                next_kind: SettlementKind::Town,
            })
            .add_systems(Startup, focus_initial_site)
            .add_systems(Update, (spawn_layout, draw_layout))
            .add_systems(EguiPrimaryContextPass, ui_main);
    }
}

fn building_height(kind: BuildingKind) -> f32 {
    match kind {
        BuildingKind::House => 4.0,
        BuildingKind::Shop => 4.5,
        BuildingKind::Warehouse => 6.0,
        BuildingKind::Tavern => 6.5,
        BuildingKind::Market => 3.0,
        BuildingKind::Temple => 12.0,
        BuildingKind::Castle => 16.0,
    }
}

fn building_color(kind: BuildingKind) -> Color {
    match kind {
        BuildingKind::House => Color::srgb(0.76, 0.64, 0.50),
        BuildingKind::Shop => Color::srgb(0.70, 0.52, 0.38),
        BuildingKind::Warehouse => Color::srgb(0.55, 0.47, 0.40),
        BuildingKind::Tavern => Color::srgb(0.62, 0.35, 0.24),
        BuildingKind::Market => Color::srgb(0.85, 0.74, 0.40),
        BuildingKind::Temple => Color::srgb(0.88, 0.86, 0.80),
        BuildingKind::Castle => Color::srgb(0.50, 0.50, 0.52),
    }
}

fn street_color(kind: StreetKind) -> Color {
    match kind {
        StreetKind::Main => Color::srgb(0.95, 0.80, 0.30),
        StreetKind::District => Color::srgb(0.85, 0.85, 0.85),
        StreetKind::Alley => Color::srgba(0.60, 0.60, 0.60, 0.7),
    }
}

fn focus_initial_site(state: Res<ViewState>, mut focus: EventWriter<SettlementFocusEvent>) {
    focus.write(SettlementFocusEvent { site: state.site.clone() });
}

// rebuild meshes whenever a layout becomes ready
fn spawn_layout(
    mut commands: Commands,
    mut ready: EventReader<SettlementReadyEvent>,
    mut state: ResMut<ViewState>,
    cache: Res<SettlementCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    existing: Query<Entity, With<SettlementMesh>>,
) {
    let Some(event) = ready.read().last().copied() else {
        return;
    };
    let Some(layout) = cache.get(event.id) else {
        return;
    };

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    for building in &layout.buildings {
        let mesh = extrude_footprint(building.footprint(), building_height(building.kind()));
        commands.spawn((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: building_color(building.kind()),
                perceptual_roughness: 0.9,
                ..default()
            })),
            SettlementMesh,
        ));
    }

    state.shown = Some(event.id);
}

fn draw_layout(mut gizmos: Gizmos, state: Res<ViewState>, cache: Res<SettlementCache>) {
    // boundary
    let boundary = &state.site.boundary;
    for i in 0..boundary.len() {
        let start = boundary[i];
        let end = boundary[(i + 1) % boundary.len()];
        gizmos.line(Vec3::new(start.x, 0.01, start.y), Vec3::new(end.x, 0.01, end.y), Color::srgba(0.71, 0.24, 0.24, 0.7));
    }

    let Some(layout) = state.shown.and_then(|id| cache.get(id)) else {
        return;
    };

    for edge in layout.graph.edges() {
        if let Some((a, b)) = layout.graph.edge_endpoints(edge.id) {
            gizmos.line(Vec3::new(a.x, 0.02, a.y), Vec3::new(b.x, 0.02, b.y), street_color(edge.kind));
        }
    }

    for building in &layout.buildings {
        let corners = building.footprint();
        for i in 0..corners.len() {
            let start = corners[i];
            let end = corners[(i + 1) % corners.len()];
            gizmos.line(Vec3::new(start.x, 0.03, start.y), Vec3::new(end.x, 0.03, end.y), Color::BLACK);
        }
    }
}

fn ui_main(
    mut contexts: EguiContexts,
    mut state: ResMut<ViewState>,
    mut world_seed: ResMut<WorldSeed>,
    mut cache: ResMut<SettlementCache>,
    mut focus: EventWriter<SettlementFocusEvent>,
    mut export_events: EventWriter<ExportEvent>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::left("config_panel")
        .default_width(220.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.label("Camera: ");
            ui.label("WASD - Move");
            ui.label("Scroll - Zoom");

            ui.separator();

            ui.label(format!("World seed: {}", world_seed.0));
            if let Some(layout) = state.shown.and_then(|id| cache.get(id)) {
                ui.label(format!("Settlement {} ({})", layout.id, state.site.kind.name()));
                ui.label(format!("Intersections: {}", layout.graph.node_count()));
                ui.label(format!("Streets: {}", layout.graph.edge_count()));
                ui.label(format!("Buildings: {}", layout.buildings.len()));
            }
            ui.label(format!("Cached settlements: {}", cache.len()));

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Id");
                ui.add(egui::DragValue::new(&mut state.next_id));
            });
            let mut kind = state.next_kind;
            egui::ComboBox::from_label("Kind")
                .selected_text(kind.name())
                .show_ui(ui, |ui| {
                    for option in SettlementKind::ALL {
                        ui.selectable_value(&mut kind, option, option.name());
                    }
                });
            state.next_kind = kind;

            let mut visit = ui.button("Visit").on_hover_text("Cached settlements are not regenerated").clicked();

            if ui.button("New world").clicked() {
                world_seed.0 = rand::random();
                cache.clear();
                visit = true;
            }

            if visit {
                let site = demo_site(SettlementId(state.next_id), state.next_kind, world_seed.0);
                state.site = site.clone();
                focus.write(SettlementFocusEvent { site });
            }

            ui.separator();

            if let Some(id) = state.shown {
                if ui.button("Export OBJ").clicked() {
                    export_events.write(ExportEvent { id, filename: format!("settlement_{id}.obj") });
                }
            }
        });
}
