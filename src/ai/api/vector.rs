//! The `Vec2` script type.

use rhai::{Dynamic, Engine, FLOAT};

use super::{Fallible, number_arg};
use crate::geom::DVec2;

pub(super) fn register(engine: &mut Engine) {
    engine
        .register_type_with_name::<DVec2>("Vec2")
        .register_fn("vec2", |x: Dynamic, y: Dynamic| -> Fallible<DVec2> {
            Ok(DVec2::new(number_arg(&x, "vec2")?, number_arg(&y, "vec2")?))
        })
        .register_get("x", |v: &mut DVec2| v.x)
        .register_get("y", |v: &mut DVec2| v.y)
        .register_fn("len", |v: &mut DVec2| v.length())
        .register_fn("+", |a: DVec2, b: DVec2| a + b)
        .register_fn("-", |a: DVec2, b: DVec2| a - b)
        .register_fn("*", |a: DVec2, k: FLOAT| a * k)
        .register_fn("to_string", |v: &mut DVec2| format!("({:.1}, {:.1})", v.x, v.y))
        .register_fn("to_debug", |v: &mut DVec2| format!("vec2({}, {})", v.x, v.y));
}
