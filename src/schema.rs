// Kept in sync with the CREATE TABLE statements in repository::context.

diesel::table! {
    categories (id) {
        id -> Text,
        name -> Text,
        description -> Text,
    }
}

diesel::table! {
    images (id) {
        id -> BigInt,
        file -> Text,
        assigned_categories -> Text,
        proposed_categories -> Text,
        starred_category -> Nullable<Text>,
    }
}
