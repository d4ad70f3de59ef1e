//! Seed - Dati dimostrativi per un'installazione vuota
//!
//! Il dataset viene generato tutto in memoria (così `ThreadRng` non attraversa
//! nessun `.await`) e poi scritto in un'unica transazione. Non tocca mai un
//! database che contiene già organizzazioni o utenti.

use crate::core::{AppError, AppState};
use crate::entities::{CourseMetadata, Organization, Sentiment, User, UserRole};
use crate::repositories::{
    Count, CounterTable, CourseRepository, ExamScoreRepository, FeedbackRepository,
    NewFeedback, NewOrganization, NewUser, OrganizationRepository, StatsRepository,
    UserRepository,
};
use chrono::{Days, Duration, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{info, instrument};

pub const DEMO_ORGANIZATIONS: usize = 5;
pub const DEMO_USERS: usize = 100;
pub const DEMO_DAYS: u32 = 30;
pub const DEMO_PASSWORD: &str = "password123";

const ORGANIZATION_NAMES: [&str; DEMO_ORGANIZATIONS] = [
    "Universitas Amba",
    "SMA Nusantara",
    "Politeknik Digital",
    "Akademi Data",
    "Sekolah Koding",
];

const COURSE_TITLES: [&str; 6] = [
    "Introduction to Python",
    "Machine Learning Basics",
    "Web Development with Flask",
    "Databases 101",
    "Linear Algebra",
    "Academic Writing",
];

const FEEDBACK_COMMENTS: [(Sentiment, &str); 6] = [
    (Sentiment::Positive, "The explanations were clear and the quizzes helped a lot."),
    (Sentiment::Positive, "Great course, I finally understand the topic."),
    (Sentiment::Negative, "Too fast, the examples were hard to follow."),
    (Sentiment::Negative, "The assistant kept repeating the same answer."),
    (Sentiment::Neutral, "It was fine, some chapters could be shorter."),
    (Sentiment::Unknown, "ok"),
];

#[derive(Debug, Clone)]
pub struct DemoScore {
    pub user_id: String,
    pub exam_id: String,
    pub exam_title: String,
    pub score: i32,
}

#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub organizations: Vec<NewOrganization>,
    pub users: Vec<NewUser>,
    /// (organization_id, user_id)
    pub managers: Vec<(String, String)>,
    pub courses: Vec<CourseMetadata>,
    pub prompts: Vec<(NaiveDate, i32)>,
    pub active_users: Vec<(NaiveDate, i32)>,
    pub feedbacks: Vec<NewFeedback>,
    pub exam_scores: Vec<DemoScore>,
}

/// Genera il dataset demo: un admin, utenti distribuiti sugli ultimi `DEMO_DAYS`
/// giorni, il primo membro di ogni organizzazione ne diventa manager.
pub fn demo_dataset<R: Rng>(rng: &mut R, now: NaiveDateTime, password_hash: &str) -> DemoDataset {
    let mut codes = HashSet::new();
    let organizations: Vec<NewOrganization> = ORGANIZATION_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let invitation_code = loop {
                let code = Organization::generate_invitation_code();
                if codes.insert(code.clone()) {
                    break code;
                }
            };
            NewOrganization {
                id: Organization::new_id(),
                name: name.to_string(),
                description: Some(format!("Demo organization #{}", i + 1)),
                invitation_code,
                registered_at: now - Duration::days(DEMO_DAYS as i64),
            }
        })
        .collect();

    let mut users = Vec::with_capacity(DEMO_USERS);
    let mut managers = Vec::new();

    users.push(NewUser {
        id: User::new_id(),
        username: "admin".to_string(),
        email: "admin@ambalearn.io".to_string(),
        password_hash: Some(password_hash.to_string()),
        role: UserRole::Admin,
        organization_id: None,
        registered_at: now - Duration::days(DEMO_DAYS as i64),
    });

    for i in 1..DEMO_USERS {
        // ogni decimo utente resta senza organizzazione
        let organization = (i % 10 != 0).then(|| &organizations[i % DEMO_ORGANIZATIONS]);
        let is_manager = organization
            .map(|o| !managers.iter().any(|(org, _): &(String, String)| *org == o.id))
            .unwrap_or(false);

        let age = Duration::days(rng.gen_range(0..DEMO_DAYS as i64))
            + Duration::minutes(rng.gen_range(0..24 * 60));
        let user = NewUser {
            id: User::new_id(),
            username: format!("student{:03}", i),
            email: format!("student{:03}@ambalearn.io", i),
            password_hash: Some(password_hash.to_string()),
            role: if is_manager { UserRole::Manager } else { UserRole::User },
            organization_id: organization.map(|o| o.id.clone()),
            registered_at: now - age,
        };

        if let (true, Some(o)) = (is_manager, organization) {
            managers.push((o.id.clone(), user.id.clone()));
        }
        users.push(user);
    }

    let courses: Vec<CourseMetadata> = COURSE_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let (organization_id, owner_id) = &managers[i % managers.len()];
            CourseMetadata {
                uid: uuid::Uuid::new_v4().to_string(),
                title: title.to_string(),
                description: Some(format!("Demo course about {}", title.to_lowercase())),
                owner_id: Some(owner_id.clone()),
                organization_id: Some(organization_id.clone()),
                created_at: Some(now - Duration::days(rng.gen_range(0..DEMO_DAYS as i64))),
            }
        })
        .collect();

    let today = now.date();
    let days: Vec<NaiveDate> = (0..DEMO_DAYS as u64)
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .collect();
    let prompts: Vec<(NaiveDate, i32)> = days.iter().map(|d| (*d, rng.gen_range(20..=200))).collect();
    let active_users: Vec<(NaiveDate, i32)> = days.iter().map(|d| (*d, rng.gen_range(5..=60))).collect();

    let students: Vec<&NewUser> = users.iter().filter(|u| u.role != UserRole::Admin).collect();

    let feedbacks: Vec<NewFeedback> = (0..20)
        .filter_map(|_| {
            let user = students.choose(rng)?;
            let course = courses.choose(rng)?;
            let (sentiment, comment) = FEEDBACK_COMMENTS.choose(rng)?;
            Some(NewFeedback {
                user_id: user.id.clone(),
                comment: comment.to_string(),
                course_id: course.uid.clone(),
                course_name: course.title.clone(),
                sentiment: *sentiment,
            })
        })
        .collect();

    let exam_scores: Vec<DemoScore> = (0..40)
        .filter_map(|_| {
            let user = students.choose(rng)?;
            let course = courses.choose(rng)?;
            Some(DemoScore {
                user_id: user.id.clone(),
                exam_id: course.uid.clone(),
                exam_title: format!("{} - final exam", course.title),
                score: rng.gen_range(40..=100),
            })
        })
        .collect();

    DemoDataset {
        organizations,
        users,
        managers,
        courses,
        prompts,
        active_users,
        feedbacks,
        exam_scores,
    }
}

fn is_empty_installation(organizations: i64, users: i64) -> bool {
    organizations == 0 && users == 0
}

/// Popola il database con il dataset demo se non ci sono né organizzazioni né utenti.
/// Restituisce `true` se ha scritto qualcosa.
#[instrument(skip(state))]
pub async fn seed_if_empty(state: &AppState) -> Result<bool, AppError> {
    let (organizations, users) =
        futures::try_join!(state.organization.count(), state.user.count())?;
    if !is_empty_installation(organizations, users) {
        info!(
            "Database already has {} organizations and {} users, skipping demo seed",
            organizations, users
        );
        return Ok(false);
    }

    let password_hash = User::hash_password(DEMO_PASSWORD)?;
    let dataset = {
        let mut rng = rand::thread_rng();
        demo_dataset(&mut rng, Utc::now().naive_utc(), &password_hash)
    };

    let mut tx = state.begin().await?;

    for organization in &dataset.organizations {
        OrganizationRepository::insert(&mut tx, organization).await?;
    }
    for user in &dataset.users {
        UserRepository::insert(&mut tx, user).await?;
    }
    for (organization_id, user_id) in &dataset.managers {
        OrganizationRepository::set_manager(&mut tx, organization_id, Some(user_id.as_str())).await?;
    }
    for course in &dataset.courses {
        CourseRepository::insert(&mut tx, course).await?;
    }
    for (date, amount) in &dataset.prompts {
        StatsRepository::upsert(&mut tx, CounterTable::Prompts, *date, *amount).await?;
    }
    for (date, amount) in &dataset.active_users {
        StatsRepository::upsert(&mut tx, CounterTable::ActiveUsers, *date, *amount).await?;
    }
    for feedback in &dataset.feedbacks {
        FeedbackRepository::insert(&mut tx, feedback).await?;
    }
    for score in &dataset.exam_scores {
        ExamScoreRepository::insert(
            &mut tx,
            &score.user_id,
            &score.exam_id,
            &score.exam_title,
            score.score,
        )
        .await?;
    }

    tx.commit().await?;

    info!(
        "Demo data seeded: {} organizations, {} users, {} courses",
        dataset.organizations.len(),
        dataset.users.len(),
        dataset.courses.len()
    );
    Ok(true)
}
