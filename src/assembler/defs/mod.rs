use super::lang::Builder;

mod primitive;
mod pseudo;

pub(super) fn register(builder: &mut Builder) {
    primitive::register(builder);
    pseudo::register(builder);
}
