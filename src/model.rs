//! Core data models for the family canvas.
//! The dataset is compiled in; transforms and themes are plain value types so
//! the camera and renderer can be exercised without a browser.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: &'static str,
    pub gender: Gender,
}

impl Person {
    pub const fn new(name: &'static str, gender: Gender) -> Self {
        Self { name, gender }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FamilyTree {
    pub parents: (Person, Person),
    pub child: Person,
}

const fn tree(father: &'static str, mother: &'static str, child: Person) -> FamilyTree {
    FamilyTree {
        parents: (Person::new(father, Gender::M), Person::new(mother, Gender::F)),
        child,
    }
}

/// Reference dataset. Order is preserved by the scene builder.
pub const DATASET: [FamilyTree; 8] = [
    tree("Carlos", "Ana", Person::new("Lucía", Gender::F)),
    tree("Tomás", "Laura", Person::new("Nico", Gender::M)),
    tree("Jorge", "Rosa", Person::new("Emilia", Gender::F)),
    tree("Mateo", "Clara", Person::new("Sofía", Gender::F)),
    tree("Pedro", "Marta", Person::new("Juan", Gender::M)),
    tree("Diego", "Paula", Person::new("Isabela", Gender::F)),
    tree("Raúl", "Camila", Person::new("Elena", Gender::F)),
    tree("Lucas", "Sara", Person::new("Leo", Gender::M)),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

/// Translate-then-scale map: `screen = world * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn apply(&self, world: Point) -> Point {
        Point::new(world.x * self.k + self.x, world.y * self.k + self.y)
    }

    pub fn invert(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    /// Same scale, translation shifted by a screen-space delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Transform {
        Transform {
            x: self.x + dx,
            y: self.y + dy,
            k: self.k,
        }
    }
}

/// Drag speed estimate in screen pixels per millisecond.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors the canvas needs per theme; the page chrome is styled by the `dark` body class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub particle: &'static str,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    /// Glyph shown on the toggle button: the theme you switch to.
    pub fn toggle_glyph(self) -> &'static str {
        match self {
            Theme::Light => "☾",
            Theme::Dark => "☀",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: "#f7f7f5",
                foreground: "#222222",
                particle: "#4a90e2",
            },
            Theme::Dark => Palette {
                background: "#0e1116",
                foreground: "#e6edf3",
                particle: "#9cc7ff",
            },
        }
    }
}
