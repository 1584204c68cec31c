use crate::infrastructure::auth::hash_password;
use crate::models::{place, user};
use sea_orm::*;

/// (name, city, latitude, longitude, description)
const DEMO_PLACES: &[(&str, &str, f64, f64, &str)] = &[
    ("Lviv National Opera", "Lviv", 49.8441, 24.0262, "Opera and ballet theatre on Svobody Avenue"),
    ("Rynok Square", "Lviv", 49.8419, 24.0315, "Central square of the old town"),
    ("Vysokyi Zamok", "Lviv", 49.8483, 24.0393, "Castle hill with a view over the city"),
    ("Maidan Nezalezhnosti", "Kyiv", 50.4501, 30.5234, "Independence Square"),
    ("Saint Sophia Cathedral", "Kyiv", 50.4529, 30.5143, "11th century cathedral"),
    ("Kyiv Pechersk Lavra", "Kyiv", 50.4343, 30.5573, "Historic cave monastery"),
    ("Uzhhorod Castle", "Uzhhorod", 48.6236, 22.3030, "Medieval fortress on the hill"),
    ("Cherkasy Embankment", "Cherkasy", 49.4479, 32.0778, "Dnipro riverside walk"),
    ("Potemkin Stairs", "Odesa", 46.4887, 30.7413, "Giant stairway to the port"),
    ("Odesa Opera House", "Odesa", 46.4852, 30.7410, "Neo-baroque opera theatre"),
    ("Freedom Square", "Kharkiv", 50.0050, 36.2310, "One of the largest squares in Europe"),
];

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    // 1. Create Users
    let demo_users = [("traveller", "traveller@example.com", "Lviv"), ("olena", "olena@example.com", "Kyiv")];

    for (username, email, region) in demo_users {
        let password_hash =
            hash_password(&format!("{}123", username)).map_err(DbErr::Custom)?;
        let now = chrono::Utc::now().to_rfc3339();

        let demo = user::ActiveModel {
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(password_hash),
            region: Set(Some(region.to_owned())),
            role: Set("user".to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        user::Entity::insert(demo)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    // 2. Create Places (only into an empty map)
    if place::Entity::find().count(db).await? > 0 {
        tracing::debug!("Places already present, skipping place seed");
        return Ok(());
    }

    for (name, city, latitude, longitude, description) in DEMO_PLACES {
        let now = chrono::Utc::now().to_rfc3339();
        let poi = place::ActiveModel {
            name: Set((*name).to_owned()),
            city: Set((*city).to_owned()),
            latitude: Set(Some(*latitude)),
            longitude: Set(Some(*longitude)),
            description: Set(Some((*description).to_owned())),
            visit_radius_m: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        poi.insert(db).await?;
    }

    tracing::info!("Seeded {} places", DEMO_PLACES.len());
    Ok(())
}
