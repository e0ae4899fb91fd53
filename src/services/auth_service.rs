use crate::{database::MongoDB, models::User};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // user_id
    pub email: String,
    pub name: String,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub courses: Vec<String>,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "course-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "course-api".to_string())
}

// Generate JWT token
pub fn generate_jwt(user: &User) -> Result<String, String> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user.user_id.clone(),
        email: user.email.clone(),
        name: user.full_name(),
        iat,
        exp,
        jti,
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

// User login
pub async fn login(db: &MongoDB, request: &LoginRequest) -> Result<AuthResponse, String> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &request.email })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "Invalid credentials".to_string())?;

    let stored_password = user
        .password
        .as_ref()
        .ok_or_else(|| "Invalid credentials".to_string())?;

    let valid = verify(&request.password, stored_password)
        .map_err(|e| format!("Password verification error: {}", e))?;

    if !valid {
        return Err("Invalid credentials".to_string());
    }

    collection
        .update_one(
            doc! { "user_id": &user.user_id },
            doc! { "$set": { "last_login": BsonDateTime::now() } },
        )
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let token = generate_jwt(&user)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo {
            id: user.user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            courses: user.courses,
        },
    })
}

// User registration
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<AuthResponse, String> {
    let collection = db.collection::<User>("users");

    if request.email.is_empty() || request.password.is_empty() {
        return Err("Email and password are required".to_string());
    }
    if request.first_name.is_empty() || request.last_name.is_empty() {
        return Err("First and last name are required".to_string());
    }

    if collection
        .find_one(doc! { "email": &request.email })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .is_some()
    {
        return Err("User already exists".to_string());
    }

    let hashed_password =
        hash(&request.password, DEFAULT_COST).map_err(|e| format!("Failed to hash password: {}", e))?;

    let new_user_id = ObjectId::new().to_hex();

    let new_user = User {
        _id: None,
        user_id: new_user_id.clone(),
        email: request.email.clone(),
        password: Some(hashed_password),
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        courses: vec![],
        course_progress: vec![],
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
        last_login: Some(BsonDateTime::now()),
    };

    collection
        .insert_one(&new_user)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;

    let token = generate_jwt(&new_user)?;

    log::info!("✅ User registered successfully: {}", request.email);

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo {
            id: new_user_id,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            courses: vec![],
        },
    })
}

// Get current user profile
pub async fn get_current_user(db: &MongoDB, user_id: &str) -> Result<UserInfo, String> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found".to_string())?;

    Ok(UserInfo {
        id: user.user_id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        courses: user.courses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            _id: None,
            user_id: "64f0aa000000000000000001".to_string(),
            email: "priya@example.com".to_string(),
            password: None,
            first_name: "Priya".to_string(),
            last_name: "Sharma".to_string(),
            courses: vec![],
            course_progress: vec![],
            created_at: None,
            updated_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_jwt_round_trip() {
        let user = sample_user();
        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.user_id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, "Priya Sharma");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let user = sample_user();
        let mut token = generate_jwt(&user).unwrap();
        token.push('x');
        assert!(verify_token(&token).is_err());
    }
}
