// serializers/schemas.rs - Schemas wired into the viewsets

use super::{Field, Schema};

/// Credentials accepted by the login action
pub fn user_login_validation() -> Schema {
    Schema::new("UserLoginValidation")
        .field(Field::char("username"))
        .field(Field::char("password").write_only())
}

fn group_validation() -> Schema {
    Schema::new("GroupValidation").field(Field::char("name").max_length(150))
}

/// New account payload, used for both single and bulk creation
pub fn user_create_validation() -> Schema {
    Schema::new("UserCreateValidation")
        .field(Field::char("username").min_length(3).max_length(150))
        .field(Field::char("password").min_length(8).max_length(128).write_only())
        .field(Field::email("email").optional().allow_blank())
        .field(Field::nested("groups", group_validation(), true).optional())
}

fn group_serializer() -> Schema {
    Schema::new("GroupSerializer").field(Field::char("name"))
}

/// Public representation of an account
pub fn user_serializer() -> Schema {
    Schema::new("UserSerializer")
        .field(Field::char("id").read_only())
        .field(Field::char("username"))
        .field(Field::email("email").optional())
        .field(Field::nested("groups", group_serializer(), true).optional())
}
