//! Static scene: one group per family tree, scattered once at mount.
//!
//! Geometry is kept in group-local coordinates; the renderer translates by the
//! group origin and then by the camera transform.

use rand::Rng;

use crate::config::{ParticleConfig, SceneConfig};
use crate::model::{FamilyTree, Point, Transform};
use crate::state::Particle;

pub const CHILD_LABEL: Point = Point::new(0.0, 40.0);
pub const PARENT_OFFSET_X: f64 = 30.0;
pub const PARENT_Y: f64 = -40.0;
pub const PARENT_LABEL_Y: f64 = -55.0;
const CONNECTOR_FROM_Y: f64 = -30.0;
const CONNECTOR_TO: Point = Point::new(0.0, -10.0);
/// Group-local hover box, covering nodes and labels.
const HIT_MIN: Point = Point::new(-50.0, -70.0);
const HIT_MAX: Point = Point::new(50.0, 50.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Substitutes the fallback size for zero, negative or non-finite dimensions.
    pub fn sanitized(width: f64, height: f64, cfg: &SceneConfig) -> Self {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Self { width, height }
        } else {
            log::warn!(
                "invalid viewport {}x{}, using {}x{}",
                width,
                height,
                cfg.fallback_width,
                cfg.fallback_height
            );
            Self {
                width: cfg.fallback_width,
                height: cfg.fallback_height,
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
    Parent,
    Child,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: u32,
    pub role: NodeRole,
    pub center: Point,
    pub radius: f64,
    pub label: &'static str,
    pub label_at: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub id: u32,
    pub from: Point,
    pub to: Point,
    pub particles: Vec<Particle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeGroup {
    pub id: u32,
    pub tree_index: usize,
    pub origin: Point,
    pub parents: [Node; 2],
    pub child: Node,
    pub connectors: [Connector; 2],
}

impl TreeGroup {
    pub fn contains(&self, world: Point) -> bool {
        let x = world.x - self.origin.x;
        let y = world.y - self.origin.y;
        (HIT_MIN.x..=HIT_MAX.x).contains(&x) && (HIT_MIN.y..=HIT_MAX.y).contains(&y)
    }

    pub fn element_ids(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::once(self.id)
            .chain(self.parents.iter().map(|n| n.id))
            .chain(std::iter::once(self.child.id))
            .chain(self.connectors.iter().flat_map(|c| {
                std::iter::once(c.id).chain(c.particles.iter().map(|p| p.id))
            }))
    }
}

/// Addresses one particle for its timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleKey {
    pub group: usize,
    pub connector: usize,
    pub slot: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub viewport: Viewport,
    pub groups: Vec<TreeGroup>,
    pub particles: ParticleConfig,
}

struct IdAlloc(u32);

impl IdAlloc {
    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

impl Scene {
    /// Places each tree uniformly in `[-w, w) x [-h, h)`, in dataset order.
    pub fn build(
        dataset: &[FamilyTree],
        viewport: Viewport,
        cfg: &SceneConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let mut ids = IdAlloc(0);
        let groups = dataset
            .iter()
            .enumerate()
            .map(|(tree_index, tree)| {
                let origin = Point::new(
                    rng.random_range(-viewport.width..viewport.width),
                    rng.random_range(-viewport.height..viewport.height),
                );
                build_group(&mut ids, tree_index, tree, origin, cfg)
            })
            .collect();
        Self {
            viewport,
            groups,
            particles: cfg.particles,
        }
    }

    /// Topmost group under a world-space point.
    pub fn hit_test(&self, world: Point) -> Option<usize> {
        self.groups.iter().rposition(|g| g.contains(world))
    }

    /// Group under a screen-space pointer for the given view.
    pub fn hover_at(&self, view: Transform, pointer: Option<Point>) -> Option<usize> {
        pointer.and_then(|p| self.hit_test(view.invert(p)))
    }

    pub fn particle_keys(&self) -> Vec<ParticleKey> {
        let mut keys = Vec::new();
        for (group, g) in self.groups.iter().enumerate() {
            for (connector, c) in g.connectors.iter().enumerate() {
                keys.extend((0..c.particles.len()).map(|slot| ParticleKey {
                    group,
                    connector,
                    slot,
                }));
            }
        }
        keys
    }

    pub fn particle(&self, key: ParticleKey) -> Option<&Particle> {
        self.groups
            .get(key.group)?
            .connectors
            .get(key.connector)?
            .particles
            .get(key.slot)
    }

    pub fn particle_mut(&mut self, key: ParticleKey) -> Option<&mut Particle> {
        self.groups
            .get_mut(key.group)?
            .connectors
            .get_mut(key.connector)?
            .particles
            .get_mut(key.slot)
    }

    pub fn stop_particles(&mut self) {
        for g in &mut self.groups {
            for c in &mut g.connectors {
                c.particles
                    .iter_mut()
                    .filter(|p| p.is_started())
                    .for_each(Particle::stop);
            }
        }
    }
}

/// Stores `next` as the hovered group; returns true when it changed.
pub fn update_hover(hovered: &mut Option<usize>, next: Option<usize>) -> bool {
    if *hovered == next {
        return false;
    }
    if let Some(i) = *hovered {
        log::debug!("leave tree {i}");
    }
    if let Some(i) = next {
        log::debug!("enter tree {i}");
    }
    *hovered = next;
    true
}

fn build_group(
    ids: &mut IdAlloc,
    tree_index: usize,
    tree: &FamilyTree,
    origin: Point,
    cfg: &SceneConfig,
) -> TreeGroup {
    let id = ids.next();
    let parent = |ids: &mut IdAlloc, side: f64, name: &'static str| Node {
        id: ids.next(),
        role: NodeRole::Parent,
        center: Point::new(side * PARENT_OFFSET_X, PARENT_Y),
        radius: cfg.parent_radius,
        label: name,
        label_at: Point::new(side * PARENT_OFFSET_X, PARENT_LABEL_Y),
    };
    let parents = [
        parent(ids, -1.0, tree.parents.0.name),
        parent(ids, 1.0, tree.parents.1.name),
    ];
    let child = Node {
        id: ids.next(),
        role: NodeRole::Child,
        center: Point::default(),
        radius: cfg.child_radius,
        label: tree.child.name,
        label_at: CHILD_LABEL,
    };
    let connector = |ids: &mut IdAlloc, side: f64| {
        let id = ids.next();
        let particles = (0..cfg.particles.per_connector)
            .map(|slot| Particle::new(ids.next(), slot, &cfg.particles))
            .collect();
        Connector {
            id,
            from: Point::new(side * PARENT_OFFSET_X, CONNECTOR_FROM_Y),
            to: CONNECTOR_TO,
            particles,
        }
    };
    let connectors = [connector(ids, -1.0), connector(ids, 1.0)];
    TreeGroup {
        id,
        tree_index,
        origin,
        parents,
        child,
        connectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DATASET;
    use crate::state::Camera;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    fn scene(seed: u64, w: f64, h: f64) -> Scene {
        let cfg = SceneConfig::default();
        let vp = Viewport::sanitized(w, h, &cfg);
        Scene::build(&DATASET, vp, &cfg, &mut SmallRng::seed_from_u64(seed))
    }

    fn origins(s: &Scene) -> Vec<Point> {
        s.groups.iter().map(|g| g.origin).collect()
    }

    #[test]
    fn mount_builds_one_complete_group_per_tree() {
        let s = scene(7, 1024.0, 768.0);
        assert_eq!(s.groups.len(), 8);
        let mut seen = HashSet::new();
        for (i, g) in s.groups.iter().enumerate() {
            assert_eq!(g.tree_index, i);
            assert_eq!(g.parents.len(), 2);
            assert!(g.parents.iter().all(|n| n.role == NodeRole::Parent));
            assert_eq!(g.child.role, NodeRole::Child);
            assert_eq!(g.connectors.len(), 2);
            for c in &g.connectors {
                assert_eq!(c.particles.len(), 3);
            }
            for id in g.element_ids() {
                assert!(seen.insert(id), "duplicate element id {id}");
            }
        }
        // 8 groups x (group + 3 nodes + 2 connectors + 6 particles)
        assert_eq!(seen.len(), 8 * 12);
        assert_eq!(s.particle_keys().len(), 48);
    }

    #[test]
    fn labels_follow_dataset_order() {
        let s = scene(1, 1024.0, 768.0);
        let names: Vec<_> = s.groups.iter().map(|g| g.child.label).collect();
        let expected: Vec<_> = DATASET.iter().map(|t| t.child.name).collect();
        assert_eq!(names, expected);
        assert_eq!(s.groups[3].parents[0].label, "Mateo");
        assert_eq!(s.groups[3].parents[1].label, "Clara");
    }

    #[test]
    fn same_seed_same_layout() {
        let a = scene(42, 1024.0, 768.0);
        let b = scene(42, 1024.0, 768.0);
        assert_eq!(origins(&a), origins(&b));
        let golden = serde_json::to_string(&origins(&a)).unwrap();
        assert_eq!(golden, serde_json::to_string(&origins(&b)).unwrap());
        assert_ne!(origins(&a), origins(&scene(43, 1024.0, 768.0)));
    }

    #[test]
    fn placements_stay_inside_double_viewport() {
        for seed in 0..20 {
            let s = scene(seed, 1024.0, 768.0);
            for o in origins(&s) {
                assert!((-1024.0..1024.0).contains(&o.x));
                assert!((-768.0..768.0).contains(&o.y));
            }
        }
    }

    #[test]
    fn connectors_run_from_parent_side_to_child() {
        let s = scene(3, 1024.0, 768.0);
        let g = &s.groups[0];
        assert_eq!(g.connectors[0].from, Point::new(-30.0, -30.0));
        assert_eq!(g.connectors[1].from, Point::new(30.0, -30.0));
        assert!(g.connectors.iter().all(|c| c.to == Point::new(0.0, -10.0)));
        assert_eq!(g.parents[0].center, Point::new(-30.0, -40.0));
        assert_eq!(g.child.radius, 20.0);
    }

    #[test]
    fn invalid_viewport_falls_back() {
        let cfg = SceneConfig::default();
        for (w, h) in [(0.0, 768.0), (1024.0, -1.0), (f64::NAN, 10.0)] {
            let vp = Viewport::sanitized(w, h, &cfg);
            assert_eq!(vp.width, 800.0);
            assert_eq!(vp.height, 600.0);
        }
        let s = scene(9, 0.0, 0.0);
        assert_eq!(s.groups.len(), 8);
        for o in origins(&s) {
            assert!((-800.0..800.0).contains(&o.x));
        }
    }

    #[test]
    fn hit_test_finds_group_under_point() {
        let s = scene(11, 1024.0, 768.0);
        let g = &s.groups[5];
        let inside = Point::new(g.origin.x + 30.0, g.origin.y - 40.0);
        let topmost = s.groups.iter().rposition(|g| g.contains(inside));
        assert_eq!(s.hit_test(inside), topmost);
        assert!(topmost.unwrap() >= 5);
        let far = Point::new(1.0e6, 1.0e6);
        assert_eq!(s.hit_test(far), None);
    }

    #[test]
    fn overlapping_groups_resolve_to_last_drawn() {
        let mut s = scene(2, 1024.0, 768.0);
        let shared = Point::new(0.0, 0.0);
        for (i, g) in s.groups.iter_mut().enumerate() {
            g.origin = Point::new(1.0e4 * i as f64, 1.0e4);
        }
        s.groups[1].origin = shared;
        s.groups[6].origin = shared;
        assert_eq!(s.hit_test(shared), Some(6));
        s.groups[6].origin = Point::new(1.0e5, 1.0e5);
        assert_eq!(s.hit_test(shared), Some(1));
    }

    fn settle(cam: &mut Camera) {
        for _ in 0..2000 {
            cam.step();
        }
    }

    #[test]
    fn hover_clears_when_zoom_moves_group_from_still_pointer() {
        let s = scene(11, 1024.0, 768.0);
        let mut cam = Camera::default();
        let g = &s.groups[5];
        let pointer = Point::new(g.origin.x + 30.0, g.origin.y - 40.0);
        let mut hovered = None;
        assert!(update_hover(&mut hovered, s.hover_at(cam.current, Some(pointer))));
        assert!(hovered.is_some());

        let cursor = Point::new(pointer.x - 400.0, pointer.y);
        for _ in 0..3 {
            cam.wheel(-1.0, cursor);
        }
        settle(&mut cam);
        let under = cam.current.invert(pointer);
        assert!(!s.groups[5].contains(under));

        update_hover(&mut hovered, s.hover_at(cam.current, Some(pointer)));
        let expected = s.groups.iter().rposition(|g| g.contains(under));
        assert_eq!(hovered, expected);
        assert_ne!(hovered, Some(5));
    }

    #[test]
    fn group_gliding_under_still_pointer_lights_up() {
        let s = scene(4, 1024.0, 768.0);
        let mut cam = Camera::default();
        let pointer = Point::new(5.0e4, 5.0e4);
        let mut hovered = None;
        assert!(!update_hover(&mut hovered, s.hover_at(cam.current, Some(pointer))));

        let origin = s.groups[0].origin;
        cam.target = Transform {
            x: pointer.x - origin.x,
            y: pointer.y - origin.y,
            k: 1.0,
        };
        settle(&mut cam);
        assert!(update_hover(&mut hovered, s.hover_at(cam.current, Some(pointer))));
        assert_eq!(hovered, s.hit_test(origin));
        assert!(hovered.is_some());

        assert!(update_hover(&mut hovered, s.hover_at(cam.current, None)));
        assert_eq!(hovered, None);
    }

    #[test]
    fn particle_lookup_by_key() {
        let mut s = scene(5, 1024.0, 768.0);
        let key = ParticleKey {
            group: 2,
            connector: 1,
            slot: 2,
        };
        s.particle_mut(key).unwrap().restart(10.0);
        assert!(s.particle(key).unwrap().is_started());
        s.stop_particles();
        assert!(!s.particle(key).unwrap().is_started());
        let missing = ParticleKey {
            group: 99,
            connector: 0,
            slot: 0,
        };
        assert!(s.particle(missing).is_none());
    }
}
