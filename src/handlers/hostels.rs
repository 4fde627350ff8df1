use actix_web::{web, Responder};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;
use validator::Validate;

use crate::auth::AuthUser;
use crate::catalog::{apply_filter, CatalogQuery};
use crate::handlers::{
    bad_request, can_access_hostel, created, forbidden, not_found, server_error, success,
};
use crate::models::hostel::{
    AttachImage, ContactInfo, Coordinates, CreateHostel, Hostel, HostelDetail, HostelImage,
    HostelSummary,
};
use crate::models::room::{Room, RoomType};
use crate::models::user::Role;

#[derive(FromRow)]
struct SummaryRow {
    id: i64,
    name: String,
    description: String,
    location: String,
    price: i64,
    rating: f64,
    reviews: i64,
    phone: String,
    email: String,
    whatsapp: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    total_rooms: i64,
    available_rooms: i64,
    amenities: Option<String>,
    room_types: Option<String>,
}

async fn fetch_summaries(pool: &SqlitePool) -> Result<Vec<HostelSummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT h.id, h.name, h.description, h.location, h.price, h.rating, h.reviews,
               h.phone, h.email, h.whatsapp, h.lat, h.lng,
               COUNT(DISTINCT r.id) AS total_rooms,
               COUNT(DISTINCT CASE WHEN r.status = 'available' THEN r.id END) AS available_rooms,
               GROUP_CONCAT(DISTINCT ha.amenity) AS amenities,
               GROUP_CONCAT(DISTINCT r.type) AS room_types
        FROM hostels h
        LEFT JOIN rooms r ON r.hostel_id = h.id
        LEFT JOIN hostel_amenities ha ON ha.hostel_id = h.id
        GROUP BY h.id
        ORDER BY h.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let main_image: Option<String> = sqlx::query_scalar(
            "SELECT image_url FROM hostel_images WHERE hostel_id = ? AND is_main = 1 LIMIT 1",
        )
        .bind(row.id)
        .fetch_optional(pool)
        .await?;

        summaries.push(HostelSummary {
            id: row.id,
            name: row.name,
            description: row.description,
            location: row.location,
            price: row.price,
            rating: row.rating,
            reviews: row.reviews,
            main_image,
            amenities: split_concat(row.amenities),
            room_types: split_concat(row.room_types)
                .iter()
                .filter_map(|s| RoomType::from_str(s).ok())
                .collect(),
            total_rooms: row.total_rooms,
            available_rooms: row.available_rooms,
            contact: ContactInfo {
                phone: row.phone,
                email: row.email,
                whatsapp: row.whatsapp,
            },
            coordinates: match (row.lat, row.lng) {
                (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
                _ => None,
            },
        });
    }
    Ok(summaries)
}

fn split_concat(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn get_hostels(
    pool: web::Data<SqlitePool>,
    params: web::Query<CatalogQuery>,
) -> impl Responder {
    let summaries = match fetch_summaries(pool.get_ref()).await {
        Ok(summaries) => summaries,
        Err(_) => return server_error("Error fetching hostels"),
    };

    let filtered = apply_filter(&summaries, &params.into_inner().into_filter());
    success("Hostels retrieved successfully", filtered)
}

pub async fn get_hostel_by_id(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> impl Responder {
    let id = path.into_inner();

    let hostel = match sqlx::query_as::<_, Hostel>("SELECT * FROM hostels WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(hostel)) => hostel,
        Ok(None) => return not_found("Hostel not found"),
        Err(_) => return server_error("Error fetching hostel"),
    };

    let amenities: Vec<String> = match sqlx::query_scalar(
        "SELECT amenity FROM hostel_amenities WHERE hostel_id = ? ORDER BY amenity",
    )
    .bind(id)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(amenities) => amenities,
        Err(_) => return server_error("Error fetching hostel"),
    };

    let images = match sqlx::query_as::<_, HostelImage>(
        "SELECT id, image_url, is_main FROM hostel_images WHERE hostel_id = ? ORDER BY is_main DESC, id",
    )
    .bind(id)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(images) => images,
        Err(_) => return server_error("Error fetching hostel"),
    };

    let rooms = match sqlx::query_as::<_, Room>(
        "SELECT * FROM rooms WHERE hostel_id = ? ORDER BY room_number",
    )
    .bind(id)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(rooms) => rooms,
        Err(_) => return server_error("Error fetching hostel"),
    };

    success(
        "Hostel retrieved successfully",
        HostelDetail {
            id: hostel.id,
            name: hostel.name,
            description: hostel.description,
            location: hostel.location,
            price: hostel.price,
            rating: hostel.rating,
            reviews: hostel.reviews,
            contact: ContactInfo {
                phone: hostel.phone,
                email: hostel.email,
                whatsapp: hostel.whatsapp,
            },
            coordinates: match (hostel.lat, hostel.lng) {
                (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
                _ => None,
            },
            amenities,
            images,
            rooms,
            created_at: hostel.created_at,
        },
    )
}

pub async fn create_hostel(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Json<CreateHostel>,
) -> impl Responder {
    if !user.has_role(Role::HostelOwner) {
        return forbidden("Only hostel owners can create hostels");
    }
    if let Err(e) = body.validate() {
        return bad_request(&e.to_string());
    }

    // Hostel, amenities and images land atomically or not at all.
    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(_) => return server_error("Failed to start transaction"),
    };

    let hostel_id = match sqlx::query(
        r#"
        INSERT INTO hostels (owner_id, name, description, location, price, phone, email, whatsapp, lat, lng)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user.id)
    .bind(&body.name)
    .bind(&body.description)
    .bind(&body.location)
    .bind(body.price)
    .bind(body.phone.as_deref().unwrap_or_default())
    .bind(body.email.as_deref().unwrap_or_default())
    .bind(body.whatsapp.as_deref())
    .bind(body.lat)
    .bind(body.lng)
    .fetch_one(&mut *tx)
    .await
    {
        Ok(row) => row.get::<i64, _>("id"),
        Err(_) => return server_error("Failed to create hostel"),
    };

    for amenity in &body.amenities {
        if sqlx::query("INSERT INTO hostel_amenities (hostel_id, amenity) VALUES (?, ?)")
            .bind(hostel_id)
            .bind(amenity)
            .execute(&mut *tx)
            .await
            .is_err()
        {
            return server_error("Failed to save amenities");
        }
    }

    for (position, image_url) in body.images.iter().enumerate() {
        let is_main = position == 0;
        if sqlx::query("INSERT INTO hostel_images (hostel_id, image_url, is_main) VALUES (?, ?, ?)")
            .bind(hostel_id)
            .bind(image_url)
            .bind(is_main)
            .execute(&mut *tx)
            .await
            .is_err()
        {
            return server_error("Failed to save images");
        }
    }

    if tx.commit().await.is_err() {
        return server_error("Failed to commit transaction");
    }

    created(
        "Hostel created successfully",
        serde_json::json!({ "hostelId": hostel_id }),
    )
}

pub async fn upload_hostel_image(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<AttachImage>,
) -> impl Responder {
    let hostel_id = path.into_inner();

    if let Err(e) = body.validate() {
        return bad_request(&e.to_string());
    }

    match can_access_hostel(pool.get_ref(), hostel_id, &user).await {
        Ok(Some(true)) => {}
        Ok(Some(false)) => return forbidden("Access denied"),
        Ok(None) => return not_found("Hostel not found"),
        Err(_) => return server_error("Database error"),
    }

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(_) => return server_error("Failed to start transaction"),
    };

    // A new main image demotes the previous one.
    if body.is_main {
        if sqlx::query("UPDATE hostel_images SET is_main = 0 WHERE hostel_id = ?")
            .bind(hostel_id)
            .execute(&mut *tx)
            .await
            .is_err()
        {
            return server_error("Failed to update main image");
        }
    }

    let image_id = match sqlx::query(
        "INSERT INTO hostel_images (hostel_id, image_url, is_main) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(hostel_id)
    .bind(&body.image_url)
    .bind(body.is_main)
    .fetch_one(&mut *tx)
    .await
    {
        Ok(row) => row.get::<i64, _>("id"),
        Err(_) => return server_error("Failed to save image"),
    };

    if tx.commit().await.is_err() {
        return server_error("Failed to commit transaction");
    }

    created(
        "Image uploaded successfully",
        serde_json::json!({ "imageId": image_id }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_token;
    use crate::config::Config;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> (SqlitePool, Config) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            payment_success_rate: 1.0,
            payment_delay_ms: 0,
        };
        (pool, config)
    }

    async fn seed_user(pool: &SqlitePool, config: &Config, email: &str, role: Role) -> (i64, String) {
        let id: i64 = sqlx::query(
            "INSERT INTO users (name, email, phone, password_hash, role) VALUES (?, ?, '', 'x', ?) RETURNING id",
        )
        .bind("Test User")
        .bind(email)
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap()
        .get("id");

        let token = generate_token(id, role, &config.jwt_secret, 1).unwrap();
        (id, token)
    }

    async fn seed_hostel(pool: &SqlitePool, owner_id: i64, name: &str, price: i64) -> i64 {
        sqlx::query(
            "INSERT INTO hostels (owner_id, name, location, price) VALUES (?, ?, 'Kikoni, Makerere', ?) RETURNING id",
        )
        .bind(owner_id)
        .bind(name)
        .bind(price)
        .fetch_one(pool)
        .await
        .unwrap()
        .get("id")
    }

    macro_rules! hostel_app {
        ($pool:expr, $config:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pool.clone()))
                    .app_data(web::Data::new($config.clone()))
                    .service(
                        web::scope("/hostels")
                            .route("", web::get().to(get_hostels))
                            .route("", web::post().to(create_hostel))
                            .route("/{id}", web::get().to(get_hostel_by_id))
                            .route("/{id}/images", web::post().to(upload_hostel_image)),
                    ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn catalog_filters_by_min_price() {
        let (pool, config) = setup().await;
        let (owner_id, _) = seed_user(&pool, &config, "owner@example.com", Role::HostelOwner).await;
        seed_hostel(&pool, owner_id, "Budget Hostel", 350_000).await;
        seed_hostel(&pool, owner_id, "Premium Hostel", 750_000).await;

        let app = hostel_app!(pool, config);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/hostels?min_price=400000")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["price"], 750_000);
        assert_eq!(data[0]["name"], "Premium Hostel");
    }

    #[actix_web::test]
    async fn create_hostel_persists_amenities_and_main_image() {
        let (pool, config) = setup().await;
        let (_, token) = seed_user(&pool, &config, "owner@example.com", Role::HostelOwner).await;

        let app = hostel_app!(pool, config);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/hostels")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({
                    "name": "Olympia Hostel",
                    "location": "Kikoni, Makerere",
                    "price": 550_000,
                    "amenities": ["wifi", "water"],
                    "images": ["https://img.example.com/1.jpg", "https://img.example.com/2.jpg"],
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let hostel_id = body["data"]["hostelId"].as_i64().unwrap();

        let amenity_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM hostel_amenities WHERE hostel_id = ?")
                .bind(hostel_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(amenity_count, 2);

        let main_image: String = sqlx::query_scalar(
            "SELECT image_url FROM hostel_images WHERE hostel_id = ? AND is_main = 1",
        )
        .bind(hostel_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(main_image, "https://img.example.com/1.jpg");
    }

    #[actix_web::test]
    async fn students_cannot_create_hostels() {
        let (pool, config) = setup().await;
        let (_, token) = seed_user(&pool, &config, "student@example.com", Role::Student).await;

        let app = hostel_app!(pool, config);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/hostels")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({
                    "name": "Olympia Hostel",
                    "location": "Kikoni",
                    "price": 550_000,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn new_main_image_demotes_previous_main() {
        let (pool, config) = setup().await;
        let (owner_id, token) =
            seed_user(&pool, &config, "owner@example.com", Role::HostelOwner).await;
        let hostel_id = seed_hostel(&pool, owner_id, "Olympia Hostel", 550_000).await;

        sqlx::query("INSERT INTO hostel_images (hostel_id, image_url, is_main) VALUES (?, 'old.jpg', 1)")
            .bind(hostel_id)
            .execute(&pool)
            .await
            .unwrap();

        let app = hostel_app!(pool, config);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/hostels/{hostel_id}/images"))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({ "image_url": "new.jpg", "is_main": true }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let mains: Vec<String> = sqlx::query_scalar(
            "SELECT image_url FROM hostel_images WHERE hostel_id = ? AND is_main = 1",
        )
        .bind(hostel_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(mains, vec!["new.jpg".to_string()]);
    }

    #[actix_web::test]
    async fn owners_cannot_touch_other_owners_hostels() {
        let (pool, config) = setup().await;
        let (owner_id, _) = seed_user(&pool, &config, "owner@example.com", Role::HostelOwner).await;
        let (_, other_token) =
            seed_user(&pool, &config, "other@example.com", Role::HostelOwner).await;
        let hostel_id = seed_hostel(&pool, owner_id, "Olympia Hostel", 550_000).await;

        let app = hostel_app!(pool, config);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/hostels/{hostel_id}/images"))
                .insert_header(("Authorization", format!("Bearer {other_token}")))
                .set_json(json!({ "image_url": "sneaky.jpg" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_hostel_detail_is_not_found() {
        let (pool, config) = setup().await;
        let app = hostel_app!(pool, config);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/hostels/999").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
