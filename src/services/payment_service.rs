// ==================== PAYMENT / ENROLLMENT ORCHESTRATION ====================
// Two-phase flow: capture creates a gateway order for the batch total, the
// client pays externally, verify checks the signed confirmation and enrolls
// the student into each course.

use crate::{
    database::{CourseStore, EnrollOutcome, ProgressStore, UserStore},
    mail::{templates, Mailer},
    razorpay::{GatewayOrder, OrderGateway},
    utils::crypto,
    utils::error::PaymentError,
};
use std::sync::Arc;
use uuid::Uuid;

pub const ORDER_CURRENCY: &str = "INR";

/// Capability set the orchestrator runs against. Production wires MongoDB,
/// Razorpay and the HTTP mailer in main; tests substitute fakes.
pub struct PaymentContext {
    pub courses: Arc<dyn CourseStore>,
    pub users: Arc<dyn UserStore>,
    pub progress: Arc<dyn ProgressStore>,
    pub gateway: Arc<dyn OrderGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub gateway_secret: String,
}

/// Validates the course batch, sums prices and requests a gateway order for
/// the total in minor currency units.
///
/// The already-enrolled check short-circuits on the first conflicting course
/// without validating the rest of the batch. Deliberately kept: the client
/// retries with a corrected batch, and no gateway order is created either way.
pub async fn capture_payment(
    ctx: &PaymentContext,
    user_id: &str,
    course_ids: &[String],
) -> Result<GatewayOrder, PaymentError> {
    if course_ids.is_empty() {
        return Err(PaymentError::ValidationFailed(
            "Please provide at least one course".to_string(),
        ));
    }

    let mut total_amount: i64 = 0;

    for course_id in course_ids {
        let course = ctx
            .courses
            .find_course(course_id)
            .await
            .map_err(PaymentError::Upstream)?
            .ok_or_else(|| PaymentError::NotFound("Course not found".to_string()))?;

        if course.student_enrolled.iter().any(|s| s == user_id) {
            return Err(PaymentError::AlreadyEnrolled(
                "User already enrolled course".to_string(),
            ));
        }

        total_amount += course.price;
    }

    let receipt = Uuid::new_v4().to_string();

    let order = ctx
        .gateway
        .create_order(total_amount * 100, ORDER_CURRENCY, &receipt)
        .await
        .map_err(PaymentError::Upstream)?;

    log::info!(
        "💳 Order {} created for user {}: {} {} across {} course(s)",
        order.id,
        user_id,
        order.amount,
        order.currency,
        course_ids.len()
    );

    Ok(order)
}

/// Checks the gateway confirmation signature and, on match, enrolls the
/// student into every course of the batch. A mismatch produces no side
/// effects.
pub async fn verify_payment(
    ctx: &PaymentContext,
    user_id: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
    course_ids: &[String],
) -> Result<(), PaymentError> {
    if order_id.is_empty()
        || payment_id.is_empty()
        || signature.is_empty()
        || course_ids.is_empty()
        || user_id.is_empty()
    {
        return Err(PaymentError::ValidationFailed("Payment Failed".to_string()));
    }

    if !crypto::verify_payment_signature(&ctx.gateway_secret, order_id, payment_id, signature) {
        log::warn!("❌ Signature mismatch for order {} (user {})", order_id, user_id);
        return Err(PaymentError::VerificationFailed);
    }

    enroll_student(ctx, course_ids, user_id).await
}

/// Enrolls the user into each course of the verified batch, in input order.
/// Each course is handled independently and idempotently: the conditional
/// append is a no-op when the user is already in the enrolled set, so a
/// partially-failed batch can be retried without duplicating anything.
pub async fn enroll_student(
    ctx: &PaymentContext,
    course_ids: &[String],
    user_id: &str,
) -> Result<(), PaymentError> {
    let user = ctx
        .users
        .find_user(user_id)
        .await
        .map_err(PaymentError::Upstream)?
        .ok_or_else(|| PaymentError::NotFound("User not found".to_string()))?;

    for course_id in course_ids {
        let course = match ctx
            .courses
            .enroll_student(course_id, user_id)
            .await
            .map_err(PaymentError::Upstream)?
        {
            EnrollOutcome::Enrolled(course) => course,
            EnrollOutcome::AlreadyEnrolled => {
                // Retried or raced enrollment. A previous attempt may have
                // died between the course append and the user-side writes,
                // so recreate whatever is still missing instead of skipping.
                reconcile_enrollment(ctx, course_id, user_id).await?;
                log::info!("ℹ️ User {} already enrolled in {}, reconciled", user_id, course_id);
                continue;
            }
            EnrollOutcome::NotFound => {
                return Err(PaymentError::NotFound("Course not found".to_string()));
            }
        };

        let progress_id = ctx
            .progress
            .create_progress(course_id, user_id)
            .await
            .map_err(PaymentError::Upstream)?;

        if !ctx
            .users
            .add_enrollment(user_id, course_id, &progress_id)
            .await
            .map_err(PaymentError::Upstream)?
        {
            return Err(PaymentError::NotFound("User not found".to_string()));
        }

        log::info!("🎓 User {} enrolled in course {}", user_id, course_id);

        // Notification failure must not abort a committed enrollment
        let subject = format!("Successfully Enrolled into {}", course.course_name);
        let body = templates::course_enrollment_email(&course.course_name, &user.full_name());
        if let Err(e) = ctx.mailer.send(&user.email, &subject, &body).await {
            log::warn!("⚠️ Enrollment email to {} failed: {}", user.email, e);
        }
    }

    Ok(())
}

/// Repairs the user-side state for a course whose enrolled set already
/// contains the user: creates the progress record if absent and re-asserts
/// the user's course/progress refs. Both writes are set-semantic, and the
/// unique (user, course) progress index makes the create race-safe, so the
/// user's course and progress sets stay index-aligned across retries.
async fn reconcile_enrollment(
    ctx: &PaymentContext,
    course_id: &str,
    user_id: &str,
) -> Result<(), PaymentError> {
    let progress_id = match ctx
        .progress
        .find_progress(course_id, user_id)
        .await
        .map_err(PaymentError::Upstream)?
    {
        Some(id) => id,
        None => ctx
            .progress
            .create_progress(course_id, user_id)
            .await
            .map_err(PaymentError::Upstream)?,
    };

    if !ctx
        .users
        .add_enrollment(user_id, course_id, &progress_id)
        .await
        .map_err(PaymentError::Upstream)?
    {
        return Err(PaymentError::NotFound("User not found".to_string()));
    }

    Ok(())
}

/// Sends the "payment received" email. Purely side-effecting; no state
/// mutation.
pub async fn send_payment_success_email(
    ctx: &PaymentContext,
    user_id: &str,
    order_id: &str,
    payment_id: &str,
    amount: i64,
) -> Result<(), PaymentError> {
    if order_id.is_empty() || payment_id.is_empty() || amount <= 0 || user_id.is_empty() {
        return Err(PaymentError::ValidationFailed(
            "Please provide all the fields".to_string(),
        ));
    }

    let user = ctx
        .users
        .find_user(user_id)
        .await
        .map_err(PaymentError::Upstream)?
        .ok_or_else(|| PaymentError::NotFound("User not found".to_string()))?;

    let body = templates::payment_success_email(&user.full_name(), amount, order_id, payment_id);

    ctx.mailer
        .send(&user.email, "Payment Received", &body)
        .await
        .map_err(PaymentError::Upstream)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, CourseProgress, User};
    use async_trait::async_trait;
    use mongodb::bson::oid::ObjectId;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const SECRET: &str = "test-razorpay-secret";
    const USER_ID: &str = "64f0aa000000000000000001";

    // ---------- in-memory fakes ----------

    #[derive(Default)]
    struct MemoryStore {
        courses: Mutex<HashMap<String, Course>>,
        users: Mutex<HashMap<String, User>>,
        progress: Mutex<Vec<CourseProgress>>,
        /// Fail the next N create_progress calls, to simulate a crash
        /// between the course append and the user-side writes.
        progress_failures: Mutex<u32>,
        /// Report the user as vanished from add_enrollment.
        fail_user_refs: Mutex<bool>,
    }

    #[async_trait]
    impl CourseStore for MemoryStore {
        async fn find_course(&self, course_id: &str) -> Result<Option<Course>, String> {
            Ok(self.courses.lock().unwrap().get(course_id).cloned())
        }

        async fn enroll_student(
            &self,
            course_id: &str,
            user_id: &str,
        ) -> Result<EnrollOutcome, String> {
            let mut courses = self.courses.lock().unwrap();
            match courses.get_mut(course_id) {
                None => Ok(EnrollOutcome::NotFound),
                Some(course) => {
                    if course.student_enrolled.iter().any(|s| s == user_id) {
                        Ok(EnrollOutcome::AlreadyEnrolled)
                    } else {
                        course.student_enrolled.push(user_id.to_string());
                        Ok(EnrollOutcome::Enrolled(course.clone()))
                    }
                }
            }
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn find_user(&self, user_id: &str) -> Result<Option<User>, String> {
            Ok(self.users.lock().unwrap().get(user_id).cloned())
        }

        async fn add_enrollment(
            &self,
            user_id: &str,
            course_id: &str,
            progress_id: &str,
        ) -> Result<bool, String> {
            if *self.fail_user_refs.lock().unwrap() {
                return Ok(false);
            }
            let mut users = self.users.lock().unwrap();
            match users.get_mut(user_id) {
                None => Ok(false),
                Some(user) => {
                    // $addToSet semantics
                    if !user.courses.iter().any(|c| c == course_id) {
                        user.courses.push(course_id.to_string());
                    }
                    if !user.course_progress.iter().any(|p| p == progress_id) {
                        user.course_progress.push(progress_id.to_string());
                    }
                    Ok(true)
                }
            }
        }
    }

    #[async_trait]
    impl ProgressStore for MemoryStore {
        async fn create_progress(
            &self,
            course_id: &str,
            user_id: &str,
        ) -> Result<String, String> {
            {
                let mut failures = self.progress_failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err("progress store unavailable".to_string());
                }
            }
            let id = ObjectId::new();
            self.progress.lock().unwrap().push(CourseProgress {
                _id: Some(id),
                course_id: course_id.to_string(),
                user_id: user_id.to_string(),
                completed_videos: vec![],
                created_at: None,
            });
            Ok(id.to_hex())
        }

        async fn find_progress(
            &self,
            course_id: &str,
            user_id: &str,
        ) -> Result<Option<String>, String> {
            Ok(self
                .progress
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.course_id == course_id && p.user_id == user_id)
                .and_then(|p| p._id)
                .map(|id| id.to_hex()))
        }
    }

    #[derive(Default)]
    struct MockGateway {
        orders: Mutex<Vec<(i64, String, String)>>,
    }

    #[async_trait]
    impl OrderGateway for MockGateway {
        async fn create_order(
            &self,
            amount: i64,
            currency: &str,
            receipt: &str,
        ) -> Result<GatewayOrder, String> {
            self.orders
                .lock()
                .unwrap()
                .push((amount, currency.to_string(), receipt.to_string()));
            Ok(GatewayOrder {
                id: "order_test_1".to_string(),
                amount,
                currency: currency.to_string(),
                receipt: receipt.to_string(),
                status: "created".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), String> {
            if self.fail {
                return Err("mail API down".to_string());
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    // ---------- fixtures ----------

    fn course(name: &str, price: i64) -> (String, Course) {
        let id = ObjectId::new();
        let course = Course {
            _id: Some(id),
            course_name: name.to_string(),
            description: None,
            price,
            student_enrolled: vec![],
            instructor: None,
            created_at: None,
            updated_at: None,
        };
        (id.to_hex(), course)
    }

    fn user() -> User {
        User {
            _id: None,
            user_id: USER_ID.to_string(),
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

    struct Harness {
        store: Arc<MemoryStore>,
        gateway: Arc<MockGateway>,
        mailer: Arc<RecordingMailer>,
        ctx: PaymentContext,
    }

    fn harness_with_mailer(mailer: RecordingMailer) -> Harness {
        let store = Arc::new(MemoryStore::default());
        store.users.lock().unwrap().insert(USER_ID.to_string(), user());
        let gateway = Arc::new(MockGateway::default());
        let mailer = Arc::new(mailer);
        let ctx = PaymentContext {
            courses: store.clone(),
            users: store.clone(),
            progress: store.clone(),
            gateway: gateway.clone(),
            mailer: mailer.clone(),
            gateway_secret: SECRET.to_string(),
        };
        Harness { store, gateway, mailer, ctx }
    }

    fn harness() -> Harness {
        harness_with_mailer(RecordingMailer::default())
    }

    fn add_course(h: &Harness, name: &str, price: i64) -> String {
        let (id, course) = course(name, price);
        h.store.courses.lock().unwrap().insert(id.clone(), course);
        id
    }

    // ---------- capture ----------

    #[tokio::test]
    async fn test_capture_sums_prices_in_minor_units() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        let b = add_course(&h, "Course B", 1500);

        let order = capture_payment(&h.ctx, USER_ID, &[a, b]).await.unwrap();

        assert_eq!(order.amount, 200_000);
        assert_eq!(order.currency, "INR");
        let orders = h.gateway.orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].0, 200_000);
        assert!(!orders[0].2.is_empty()); // receipt token present
    }

    #[tokio::test]
    async fn test_capture_empty_batch_rejected() {
        let h = harness();
        let err = capture_payment(&h.ctx, USER_ID, &[]).await.unwrap_err();
        assert!(matches!(err, PaymentError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_capture_unknown_course_not_found() {
        let h = harness();
        let missing = ObjectId::new().to_hex();
        let err = capture_payment(&h.ctx, USER_ID, &[missing]).await.unwrap_err();
        assert_eq!(err, PaymentError::NotFound("Course not found".to_string()));
        assert!(h.gateway.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capture_already_enrolled_creates_no_order() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        h.store
            .courses
            .lock()
            .unwrap()
            .get_mut(&a)
            .unwrap()
            .student_enrolled
            .push(USER_ID.to_string());

        let err = capture_payment(&h.ctx, USER_ID, &[a]).await.unwrap_err();

        assert!(matches!(err, PaymentError::AlreadyEnrolled(_)));
        assert!(h.gateway.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capture_first_conflict_wins_over_later_missing_course() {
        // The duplicate check reports the first already-enrolled course and
        // never inspects the rest of the batch.
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        h.store
            .courses
            .lock()
            .unwrap()
            .get_mut(&a)
            .unwrap()
            .student_enrolled
            .push(USER_ID.to_string());
        let missing = ObjectId::new().to_hex();

        let err = capture_payment(&h.ctx, USER_ID, &[a, missing]).await.unwrap_err();
        assert!(matches!(err, PaymentError::AlreadyEnrolled(_)));
    }

    // ---------- verify ----------

    fn signature_for(order_id: &str, payment_id: &str) -> String {
        crypto::sign_payment(SECRET, order_id, payment_id).unwrap()
    }

    #[tokio::test]
    async fn test_verify_missing_fields_has_no_side_effects() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);

        let err = verify_payment(&h.ctx, USER_ID, "order_1", "", "sig", &[a.clone()])
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::ValidationFailed("Payment Failed".to_string()));
        let courses = h.store.courses.lock().unwrap();
        assert!(courses.get(&a).unwrap().student_enrolled.is_empty());
        assert!(h.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_bad_signature_has_no_side_effects() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        let mut sig = signature_for("order_1", "pay_1");
        let flipped = if sig.starts_with('0') { "1" } else { "0" };
        sig.replace_range(0..1, flipped);

        let err = verify_payment(&h.ctx, USER_ID, "order_1", "pay_1", &sig, &[a.clone()])
            .await
            .unwrap_err();

        assert_eq!(err, PaymentError::VerificationFailed);
        assert_eq!(err.to_string(), "Payment Failed");
        let courses = h.store.courses.lock().unwrap();
        assert!(courses.get(&a).unwrap().student_enrolled.is_empty());
        assert!(h.store.progress.lock().unwrap().is_empty());
        assert!(h.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_valid_signature_enrolls_and_notifies() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        let sig = signature_for("order_1", "pay_1");

        verify_payment(&h.ctx, USER_ID, "order_1", "pay_1", &sig, &[a.clone()])
            .await
            .unwrap();

        let courses = h.store.courses.lock().unwrap();
        assert_eq!(courses.get(&a).unwrap().student_enrolled, vec![USER_ID.to_string()]);

        let users = h.store.users.lock().unwrap();
        let enrolled = users.get(USER_ID).unwrap();
        assert_eq!(enrolled.courses, vec![a.clone()]);
        assert_eq!(enrolled.course_progress.len(), 1);

        let progress = h.store.progress.lock().unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].course_id, a);
        assert_eq!(progress[0].user_id, USER_ID);
        assert!(progress[0].completed_videos.is_empty());

        let sent = h.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "priya@example.com");
        assert!(sent[0].1.contains("Course A"));
    }

    #[tokio::test]
    async fn test_verify_batch_enrolls_in_input_order() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        let b = add_course(&h, "Course B", 1500);
        let sig = signature_for("order_1", "pay_1");

        verify_payment(&h.ctx, USER_ID, "order_1", "pay_1", &sig, &[a.clone(), b.clone()])
            .await
            .unwrap();

        let users = h.store.users.lock().unwrap();
        let enrolled = users.get(USER_ID).unwrap();
        assert_eq!(enrolled.courses, vec![a, b]);
        assert_eq!(enrolled.course_progress.len(), 2);
        assert_eq!(h.mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_enrollment_retry_is_idempotent() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);

        enroll_student(&h.ctx, &[a.clone()], USER_ID).await.unwrap();
        enroll_student(&h.ctx, &[a.clone()], USER_ID).await.unwrap();

        let courses = h.store.courses.lock().unwrap();
        assert_eq!(courses.get(&a).unwrap().student_enrolled.len(), 1);
        let users = h.store.users.lock().unwrap();
        assert_eq!(users.get(USER_ID).unwrap().courses.len(), 1);
        assert_eq!(h.store.progress.lock().unwrap().len(), 1);
        assert_eq!(h.mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_partial_failure_repairs_enrollment() {
        // First pass dies after the course append but before the progress
        // record exists; the retry must recreate the missing pieces rather
        // than treating the enrolled set as proof of a completed enrollment.
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        *h.store.progress_failures.lock().unwrap() = 1;

        let err = enroll_student(&h.ctx, &[a.clone()], USER_ID).await.unwrap_err();
        assert!(matches!(err, PaymentError::Upstream(_)));
        {
            let courses = h.store.courses.lock().unwrap();
            assert_eq!(courses.get(&a).unwrap().student_enrolled.len(), 1);
            assert!(h.store.progress.lock().unwrap().is_empty());
            let users = h.store.users.lock().unwrap();
            assert!(users.get(USER_ID).unwrap().courses.is_empty());
        }

        enroll_student(&h.ctx, &[a.clone()], USER_ID).await.unwrap();

        let courses = h.store.courses.lock().unwrap();
        assert_eq!(courses.get(&a).unwrap().student_enrolled.len(), 1);
        let progress = h.store.progress.lock().unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].course_id, a);
        let users = h.store.users.lock().unwrap();
        let enrolled = users.get(USER_ID).unwrap();
        assert_eq!(enrolled.courses, vec![a.clone()]);
        assert_eq!(enrolled.course_progress.len(), 1);
    }

    #[tokio::test]
    async fn test_enroll_vanished_user_reported_not_found() {
        let h = harness();
        let a = add_course(&h, "Course A", 500);
        *h.store.fail_user_refs.lock().unwrap() = true;

        let err = enroll_student(&h.ctx, &[a.clone()], USER_ID).await.unwrap_err();
        assert_eq!(err, PaymentError::NotFound("User not found".to_string()));
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_abort_enrollment() {
        let h = harness_with_mailer(RecordingMailer { fail: true, ..Default::default() });
        let a = add_course(&h, "Course A", 500);
        let sig = signature_for("order_1", "pay_1");

        verify_payment(&h.ctx, USER_ID, "order_1", "pay_1", &sig, &[a.clone()])
            .await
            .unwrap();

        let courses = h.store.courses.lock().unwrap();
        assert_eq!(courses.get(&a).unwrap().student_enrolled.len(), 1);
        assert_eq!(h.store.progress.lock().unwrap().len(), 1);
    }

    // ---------- payment success email ----------

    #[tokio::test]
    async fn test_payment_success_email_sent() {
        let h = harness();

        send_payment_success_email(&h.ctx, USER_ID, "order_1", "pay_1", 200_000)
            .await
            .unwrap();

        let sent = h.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Payment Received");
    }

    #[tokio::test]
    async fn test_payment_success_email_requires_all_fields() {
        let h = harness();
        let err = send_payment_success_email(&h.ctx, USER_ID, "", "pay_1", 200_000)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::ValidationFailed(_)));
        assert!(h.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_success_email_unknown_user() {
        let h = harness();
        let err = send_payment_success_email(&h.ctx, "missing-user", "order_1", "pay_1", 100)
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::NotFound("User not found".to_string()));
    }
}
