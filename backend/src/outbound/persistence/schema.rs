//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Keep these in step with the SQL; `diesel print-schema` against a migrated
//! database regenerates them.

diesel::table! {
    /// Registered accounts. `email` is unique.
    accounts (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        birthdate -> Nullable<Date>,
        gender -> Nullable<Varchar>,
        phone_number -> Nullable<Varchar>,
        profile_image -> Nullable<Varchar>,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    /// Plants, deleted together with their owning account.
    plants (id) {
        id -> Int8,
        common_name -> Varchar,
        scientific_name -> Varchar,
        habitat -> Varchar,
        origin -> Nullable<Varchar>,
        description -> Nullable<Varchar>,
        plant_image -> Nullable<Varchar>,
        created_by -> Uuid,
    }
}

diesel::table! {
    /// Observations. `related_plant_id` is set to NULL when the plant goes.
    observations (id) {
        id -> Int8,
        observation_image -> Nullable<Varchar>,
        related_plant_id -> Nullable<Int8>,
        date -> Date,
        time -> Time,
        location -> Varchar,
        note -> Nullable<Varchar>,
        created_by -> Uuid,
    }
}

diesel::table! {
    /// Revoked refresh tokens, purged once past `expires_at`.
    token_blacklist (jti) {
        jti -> Uuid,
        account_id -> Uuid,
        expires_at -> Timestamptz,
        revoked_at -> Timestamptz,
    }
}

diesel::joinable!(observations -> plants (related_plant_id));
diesel::joinable!(plants -> accounts (created_by));
diesel::joinable!(token_blacklist -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, observations, plants, token_blacklist);
