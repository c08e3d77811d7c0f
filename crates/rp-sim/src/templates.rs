//! Entity templates: declarative TOML tables describing the initial
//! component makeup of an entity kind ("rifleman", "factory", "shell", ...).
//!
//! A template file has scalar attributes at the top level and a nested
//! `[components]` table; each key under `components` names one component
//! kind and its table supplies that component's initial field values. A
//! component with an empty table (`weapon = {}`) still gets attached, using
//! its `Default` values — presence, not content, is what attaches it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use hecs::EntityBuilder;
use serde::{Deserialize, Serialize};

use rp_core::commands::Command;
use rp_core::components::{
    BuilderComponent, DamageableComponent, MoveableComponent, OrderableComponent, OwnableComponent,
    PathingComponent, PositionComponent, ProjectileComponent, SelectableComponent, WeaponComponent,
};
use rp_core::enums::ProjectileKind;
use rp_core::types::{Color, EntityId, Vec3};

use crate::entity::{EntityManager, Template};
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionParams {
    #[serde(default)]
    pub sit_on_terrain: bool,
    #[serde(default)]
    pub orient_to_terrain: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnableParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectableParams {
    pub selection_radius: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveableParams {
    pub speed: Option<f32>,
    pub turn_speed: Option<f32>,
    pub avoid_collisions: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathingParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderableParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponParams {
    pub range: Option<f32>,
    pub cooldown_secs: Option<f64>,
    /// Name of the template the weapon system spawns when it fires.
    pub projectile_template: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileParams {
    pub kind: Option<ProjectileKindParam>,
    pub speed: Option<f32>,
    pub damage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKindParam {
    Seeking,
    Ballistic,
}

impl From<ProjectileKindParam> for ProjectileKind {
    fn from(p: ProjectileKindParam) -> Self {
        match p {
            ProjectileKindParam::Seeking => ProjectileKind::Seeking,
            ProjectileKindParam::Ballistic => ProjectileKind::Ballistic,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageableParams {
    pub health: Option<f64>,
    pub max_health: Option<f64>,
    pub explosion_template: Option<String>,
}

/// Which components a template attaches, and their initial parameters. A
/// field being `Some` (even `Some(default)`) means the component is
/// attached; `None` means the entity has no such component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentParams {
    pub position: Option<PositionParams>,
    pub ownable: Option<OwnableParams>,
    pub selectable: Option<SelectableParams>,
    pub moveable: Option<MoveableParams>,
    pub pathing: Option<PathingParams>,
    pub orderable: Option<OrderableParams>,
    pub builder: Option<BuilderParams>,
    pub weapon: Option<WeaponParams>,
    pub projectile: Option<ProjectileParams>,
    pub damageable: Option<DamageableParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTemplate {
    #[serde(default)]
    pub components: ComponentParams,
    /// Top-level scalar attributes, copied verbatim into the entity's
    /// attribute map on creation.
    #[serde(flatten)]
    pub attributes: HashMap<String, toml::Value>,
}

#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, EntityTemplate>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.toml` file directly under `dir`, naming each template
    /// by its file stem.
    pub fn load_dir(dir: &Path) -> SimResult<Self> {
        let mut lib = Self::new();
        let entries = fs::read_dir(dir)?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| SimError::Parse(format!("non-utf8 template filename: {}", path.display())))?
                .to_string();
            let text = fs::read_to_string(&path)?;
            let template: EntityTemplate =
                toml::from_str(&text).map_err(|e| SimError::Parse(format!("{}: {}", path.display(), e)))?;
            lib.templates.insert(name, template);
        }
        Ok(lib)
    }

    pub fn insert(&mut self, name: impl Into<String>, template: EntityTemplate) {
        self.templates.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&EntityTemplate> {
        self.templates.get(name)
    }
}

/// Spawns an entity from `template_name`, applying `initial_pos`/
/// `initial_goal` on top of the template's own position/moveable defaults,
/// and registers it in `entities` under `id`.
pub fn apply_template(
    entities: &mut EntityManager,
    templates: &TemplateLibrary,
    template_name: &str,
    id: EntityId,
    owner: rp_core::types::PlayerNo,
    color: Color,
    initial_pos: Vec3,
    initial_goal: Vec3,
) -> SimResult<()> {
    let template = templates
        .get(template_name)
        .ok_or_else(|| SimError::NotFound(template_name.to_string()))?;

    let mut builder = EntityBuilder::new();
    builder.add(Template(template_name.to_string()));

    let comps = &template.components;

    if let Some(p) = &comps.position {
        let mut pos = PositionComponent {
            pos: initial_pos,
            ..PositionComponent::default()
        };
        pos.set_sit_on_terrain(p.sit_on_terrain);
        if p.orient_to_terrain {
            pos.orient_to_terrain = true;
        }
        builder.add(pos);
    }

    if comps.ownable.is_some() {
        builder.add(OwnableComponent { owner, color });
    }

    if let Some(p) = &comps.selectable {
        let mut c = SelectableComponent::default();
        if let Some(r) = p.selection_radius {
            c.selection_radius = r;
        }
        builder.add(c);
    }

    if let Some(p) = &comps.moveable {
        let mut c = MoveableComponent::default();
        if let Some(s) = p.speed {
            c.speed = s;
        }
        if let Some(t) = p.turn_speed {
            c.turn_speed = t;
        }
        if let Some(a) = p.avoid_collisions {
            c.avoid_collisions = a;
        }
        c.goal = initial_pos.add(&initial_goal);
        builder.add(c);
    }

    if comps.pathing.is_some() {
        builder.add(PathingComponent::default());
    }

    if comps.orderable.is_some() {
        builder.add(OrderableComponent::default());
    }

    if comps.builder.is_some() {
        builder.add(BuilderComponent::default());
    }

    if let Some(p) = &comps.weapon {
        let mut c = WeaponComponent::default();
        if let Some(r) = p.range {
            c.range = r;
        }
        if let Some(cd) = p.cooldown_secs {
            c.cooldown_secs = cd;
        }
        builder.add(c);
        if let Some(projectile_template) = &p.projectile_template {
            builder.add(crate::systems::weapon::WeaponLoadout(projectile_template.clone()));
        }
    }

    if let Some(p) = &comps.projectile {
        builder.add(ProjectileComponent {
            kind: p.kind.map(ProjectileKind::from).unwrap_or(ProjectileKind::Ballistic),
            target: None,
            speed: p.speed.unwrap_or(10.0),
            damage: p.damage.unwrap_or(10.0),
        });
    }

    if let Some(p) = &comps.damageable {
        let mut c = DamageableComponent::default();
        if let Some(h) = p.health {
            c.health = h;
        }
        if let Some(m) = p.max_health {
            c.max_health = m;
        }
        if p.explosion_template.is_some() {
            c.explosion_template = p.explosion_template.clone();
        }
        builder.add(c);
    }

    let entity = entities.world_mut().spawn(builder.build());
    entities.register(id, entity);
    Ok(())
}

/// Resolves an already-validated `Command::CreateEntity` against the
/// template library. Callers are expected to have already checked the
/// command is well-formed; this is the single place template instantiation
/// happens regardless of whether the command originated locally or from a
/// peer.
pub fn apply_create_entity(entities: &mut EntityManager, templates: &TemplateLibrary, cmd: &Command) -> SimResult<()> {
    match cmd {
        Command::CreateEntity {
            player_no,
            new_id,
            template_name,
            initial_pos,
            initial_goal,
        } => {
            let color = default_color_for_player(*player_no);
            apply_template(
                entities,
                templates,
                template_name,
                *new_id,
                *player_no,
                color,
                *initial_pos,
                *initial_goal,
            )
        }
        other => Err(SimError::Invariant(format!("apply_create_entity called with {:?}", other.wire_id()))),
    }
}

pub fn default_color_for_player(player_no: rp_core::types::PlayerNo) -> Color {
    const PALETTE: [(u8, u8, u8); 8] = [
        (220, 40, 40),
        (40, 120, 220),
        (40, 180, 80),
        (220, 180, 40),
        (180, 60, 200),
        (40, 200, 200),
        (240, 140, 40),
        (160, 160, 160),
    ];
    let (r, g, b) = PALETTE[(player_no.0 as usize) % PALETTE.len()];
    Color::from_rgba(r, g, b, 255)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::types::PlayerNo;
    use std::io::Write;

    fn write_template(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(format!("{name}.toml"));
        let mut f = fs::File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_dir_reads_toml_templates() {
        let dir = tempfile::tempdir().unwrap();
        write_template(
            dir.path(),
            "rifleman",
            r#"
            display_name = "Rifleman"

            [components]
            position = {}
            ownable = {}
            selectable = { selection_radius = 1.5 }
            moveable = { speed = 4.0 }
            orderable = {}
            damageable = { health = 50.0 }
            "#,
        );

        let lib = TemplateLibrary::load_dir(dir.path()).unwrap();
        let template = lib.get("rifleman").unwrap();
        assert!(template.components.moveable.is_some());
        assert_eq!(template.components.moveable.as_ref().unwrap().speed, Some(4.0));
        assert!(matches!(template.attributes.get("display_name"), Some(toml::Value::String(s)) if s == "Rifleman"));
    }

    #[test]
    fn test_apply_template_attaches_only_present_components() {
        let mut entities = EntityManager::new();
        let mut lib = TemplateLibrary::new();
        lib.insert(
            "scout",
            EntityTemplate {
                components: ComponentParams {
                    position: Some(PositionParams::default()),
                    moveable: Some(MoveableParams {
                        speed: Some(6.0),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                attributes: HashMap::new(),
            },
        );

        let player = PlayerNo(1);
        let id = entities.allocate_id(player).unwrap();
        apply_template(
            &mut entities,
            &lib,
            "scout",
            id,
            player,
            Color::from_rgba(1, 2, 3, 255),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::ZERO,
        )
        .unwrap();

        let entity = entities.get(id).unwrap();
        let world = entities.world();
        assert!(world.get::<&PositionComponent>(entity).is_ok());
        assert!(world.get::<&MoveableComponent>(entity).is_ok());
        assert!(world.get::<&WeaponComponent>(entity).is_err());
        let moveable = world.get::<&MoveableComponent>(entity).unwrap();
        assert_eq!(moveable.speed, 6.0);
    }

    #[test]
    fn test_apply_template_missing_name_errors() {
        let mut entities = EntityManager::new();
        let lib = TemplateLibrary::new();
        let player = PlayerNo(1);
        let id = entities.allocate_id(player).unwrap();
        let err = apply_template(
            &mut entities,
            &lib,
            "nonexistent",
            id,
            player,
            Color::default(),
            Vec3::ZERO,
            Vec3::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::NotFound(_)));
    }
}
