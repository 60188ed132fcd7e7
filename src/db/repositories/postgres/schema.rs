//! Diesel table definitions for the booking schema.

diesel::table! {
    buildings (building_id) {
        building_id -> Text,
        floor -> Int4,
    }
}

diesel::table! {
    rooms (room_id) {
        room_id -> Text,
        building_id -> Text,
        room_status -> Text,
    }
}

diesel::table! {
    bookings (booking_id) {
        booking_id -> Text,
        building_id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        created_by -> Text,
        modified_by -> Text,
        booking_type -> Text,
        repeat_interval -> Text,
        repeat_day -> Text,
        last_update -> Timestamptz,
    }
}

diesel::joinable!(rooms -> buildings (building_id));
diesel::joinable!(bookings -> buildings (building_id));

diesel::allow_tables_to_appear_in_same_query!(buildings, rooms, bookings);
