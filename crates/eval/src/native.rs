//! The catalog's features expressed directly in Rust, where the compiler
//! is the checker.

use std::fmt;

use crate::sink::{Channel, Sink};

/// `[string, number]`
pub type Basket = (String, f64);

/// Discriminants start at 1 and count up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Size {
    Small = 1,
    Medium,
    Large,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    pub fn name(self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Reverse lookup, `Size[2]`.
    pub fn from_value(value: u8) -> Option<Size> {
        Size::ALL.into_iter().find(|s| s.value() == value)
    }

    /// Forward lookup, `Size["Medium"]`.
    pub fn from_name(name: &str) -> Option<Size> {
        Size::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl TryFrom<u8> for Size {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Size::from_value(value).ok_or(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotArmy {
    pub count: u32,
    pub kind: String,
    pub magic: Option<String>,
}

pub fn fight_robot_army(sink: &mut dyn Sink, _robots: &RobotArmy) {
    sink.emit(Channel::Console, "FIGHT!");
}

pub mod zoo {
    /// `sing` is private to this module; `greet` exposes it.
    #[derive(Debug)]
    pub struct Animal {
        sing: String,
    }

    impl Animal {
        pub fn new(sound: &str) -> Self {
            Animal {
                sing: sound.to_owned(),
            }
        }

        pub fn greet(&self) -> String {
            format!("Hello, {}", self.sing)
        }
    }
}

/// `string | number`
#[derive(Debug, Clone, PartialEq)]
pub enum Confused {
    Text(String),
    Number(f64),
}

impl Confused {
    pub fn describe(&self) -> String {
        match self {
            Confused::Text(s) => format!("text of length {}", s.chars().count()),
            Confused::Number(n) => format!("number {}", n),
        }
    }
}

impl fmt::Display for Confused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confused::Text(s) => f.write_str(s),
            Confused::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Never returns.
pub fn error() -> ! {
    panic!("blah!")
}

/// `(): void`
pub fn sing(sink: &mut dyn Sink) {
    sink.emit(Channel::Console, "Lalalala");
}

/// Walk through every rendition, writing what each shows to `sink`.
pub fn demonstrate(sink: &mut dyn Sink) {
    let mut line = |text: String| sink.emit(Channel::Console, &text);

    let is_cool: bool = false;
    let age: u32 = 56;
    let eye_color: &str = "brown";
    line(format!("boolean: {}", is_cool));
    line(format!("number: {}", age));
    line(format!("string: {}", eye_color));
    line(format!("template: I'm not old, I'm only {}", age));

    let pets: Vec<&str> = vec!["cat", "mouse", "dragon"];
    let pets2: Vec<&str> = vec!["pig", "lion", "dragon"];
    line(format!("array: {:?} {:?}", pets, pets2));

    let basket: Basket = ("basketball".to_owned(), 10.0);
    line(format!("tuple: ({:?}, {})", basket.0, basket.1));

    let size_name = Size::from_value(2).map_or("?", Size::name);
    line(format!("enum: Size[2] = {}", size_name));

    let meh: Option<()> = None;
    line(format!("undefined: {:?}", meh));

    let army = RobotArmy {
        count: 10,
        kind: "dragon".to_owned(),
        magic: None,
    };
    line(format!("interface: {:?}", army));

    let lion = zoo::Animal::new("Lion");
    line(format!("class: {}", lion.greet()));

    let x = 3;
    line(format!("inference: {}", x));

    let mut confused = Confused::Text("hello".to_owned());
    line(format!("union: {}", confused));
    confused = Confused::Number(42.0);
    line(format!("union: {} ({})", confused, confused.describe()));

    sing(sink);
    fight_robot_army(sink, &army);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;

    #[test]
    fn size_maps_both_ways() {
        assert_eq!(Size::from_value(2).map(Size::name), Some("Medium"));
        assert_eq!(Size::from_value(3), Some(Size::Large));
        assert_eq!(Size::from_name("Small").map(Size::value), Some(1));
        assert_eq!(Size::try_from(9), Err(9));
    }

    #[test]
    fn optional_magic_may_be_omitted() {
        let army = RobotArmy {
            count: 10,
            kind: "dragon".into(),
            magic: None,
        };
        assert!(army.magic.is_none());
    }

    #[test]
    fn animal_greets() {
        assert_eq!(zoo::Animal::new("Lion").greet(), "Hello, Lion");
    }

    #[test]
    fn confused_holds_either() {
        assert_eq!(Confused::Text("hello".into()).describe(), "text of length 5");
        assert_eq!(Confused::Number(42.0).to_string(), "42");
    }

    #[test]
    #[should_panic(expected = "blah!")]
    fn error_never_returns() {
        error();
    }

    #[test]
    fn demonstrate_ends_with_side_effects() {
        let sink = BufferSink::new();
        demonstrate(&mut sink.clone());
        let texts = sink.texts();
        assert!(texts.contains(&"enum: Size[2] = Medium".to_owned()));
        assert!(texts.contains(&"class: Hello, Lion".to_owned()));
        assert_eq!(texts[texts.len() - 2..], ["Lalalala", "FIGHT!"]);
    }
}
