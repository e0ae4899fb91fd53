pub mod stores;

pub use stores::{CourseStore, EnrollOutcome, ProgressStore, UserStore};

use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool tuning
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .unwrap_or("StudyNotion");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates necessary indexes for query performance and the enrollment
    /// invariants (one progress record per (user, course), unique emails).
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.database().collection::<mongodb::bson::Document>("users");

        let user_id_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(user_id_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(user_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // Unique compound index backs the "never two progress records for the
        // same (user, course) pair" invariant even under concurrent verifies.
        let progress = self
            .database()
            .collection::<mongodb::bson::Document>("course_progress");

        let progress_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "course_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match progress.create_index(progress_index).await {
            Ok(_) => log::info!("   ✅ Index created: course_progress(user_id, course_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let courses = self.database().collection::<mongodb::bson::Document>("courses");

        let course_name_index = IndexModel::builder()
            .keys(doc! { "course_name": 1 })
            .build();

        match courses.create_index(course_name_index).await {
            Ok(_) => log::info!("   ✅ Index created: courses(course_name)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
