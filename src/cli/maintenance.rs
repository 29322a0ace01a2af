//! Database maintenance commands: bulk clear and demo-data seeding.

use super::output::Output;
use crate::auth::CredentialHasher;
use crate::db::DatabaseClient;
use crate::types::{Animal, TrainingLog, User};
use anyhow::{bail, Context};
use chrono::{Duration, Utc};
use rand::distr::{Alphanumeric, SampleString};
use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bea", "Cal", "Dana", "Eli", "Fern", "Gus", "Hana", "Ivo", "June", "Kai", "Lena",
];
const LAST_NAMES: &[&str] = &[
    "Abbott", "Barker", "Castillo", "Dunn", "Ellis", "Fischer", "Garza", "Holm", "Ito", "Jensen",
];
const ANIMAL_NAMES: &[&str] = &[
    "Biscuit", "Clover", "Juniper", "Maple", "Pepper", "Rocket", "Scout", "Waffles", "Ziggy",
];
const SKILLS: &[&str] = &[
    "recall", "loose-leash walking", "stay", "place", "crate training", "heel", "leave it",
];
const SETTINGS: &[&str] = &["in the park", "at home", "on a busy street", "at the beach"];

const PROFILE_PICTURE: &str = "https://example.com/profile.jpg";
const ANIMAL_PICTURE: &str = "https://example.com/animal.jpg";
const TRAINING_VIDEO: &str = "https://example.com/training-log.mp4";

/// How many records of each kind to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub users: usize,
    pub animals: usize,
    pub logs: usize,
}

/// Generated records, plus each user's plaintext password.
pub struct SeedData {
    pub users: Vec<(User, String)>,
    pub animals: Vec<Animal>,
    pub logs: Vec<TrainingLog>,
}

/// Generates random demo records with valid cross references.
///
/// Passwords are hashed here, so this is the slow part of seeding.
pub fn generate(counts: SeedCounts, hasher: &CredentialHasher) -> anyhow::Result<SeedData> {
    if counts.users == 0 && (counts.animals > 0 || counts.logs > 0) {
        bail!("animals and training logs need at least one user");
    }
    if counts.animals == 0 && counts.logs > 0 {
        bail!("training logs need at least one animal");
    }

    let mut rng = rand::rng();
    let now = Utc::now();

    let mut users = Vec::with_capacity(counts.users);
    for _ in 0..counts.users {
        let first_name = pick(&mut rng, FIRST_NAMES);
        let last_name = pick(&mut rng, LAST_NAMES);
        let password = Alphanumeric.sample_string(&mut rng, 16);
        let email = format!(
            "{}.{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            Alphanumeric.sample_string(&mut rng, 6).to_lowercase()
        );

        let user = User {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            email,
            password_hash: hasher.hash(&password)?,
            profile_picture: rng.random_bool(0.5).then(|| PROFILE_PICTURE.to_string()),
        };
        users.push((user, password));
    }

    let mut animals = Vec::with_capacity(counts.animals);
    for _ in 0..counts.animals {
        let owner = &users[rng.random_range(0..users.len())].0;
        animals.push(Animal {
            id: Uuid::new_v4().to_string(),
            name: format!("{} {}", pick(&mut rng, ANIMAL_NAMES), owner.last_name),
            hours_trained: rng.random_range(0..=100) as f64,
            owner: owner.id.clone(),
            date_of_birth: Some(now - Duration::days(rng.random_range(60..=5000))),
            profile_picture: rng.random_bool(0.5).then(|| ANIMAL_PICTURE.to_string()),
        });
    }

    let mut logs = Vec::with_capacity(counts.logs);
    for _ in 0..counts.logs {
        let animal = &animals[rng.random_range(0..animals.len())];
        let user = &users[rng.random_range(0..users.len())].0;
        logs.push(TrainingLog {
            id: Uuid::new_v4().to_string(),
            date: now - Duration::hours(rng.random_range(1..=24 * 365)),
            description: format!(
                "Worked on {} {}",
                pick(&mut rng, SKILLS),
                pick(&mut rng, SETTINGS)
            ),
            hours: rng.random_range(1..=10) as f64,
            animal: animal.id.clone(),
            user: user.id.clone(),
            training_log_video: rng.random_bool(0.5).then(|| TRAINING_VIDEO.to_string()),
        });
    }

    Ok(SeedData {
        users,
        animals,
        logs,
    })
}

fn pick(rng: &mut impl Rng, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

/// Inserts `data`, users first so references resolve.
pub async fn insert(db: &dyn DatabaseClient, data: &SeedData) -> anyhow::Result<()> {
    for (user, _) in &data.users {
        db.create_user(user)
            .await
            .with_context(|| format!("Failed to insert user {}", user.email))?;
    }
    for animal in &data.animals {
        db.create_animal(animal)
            .await
            .with_context(|| format!("Failed to insert animal {}", animal.id))?;
    }
    for log in &data.logs {
        db.create_training_log(log)
            .await
            .with_context(|| format!("Failed to insert training log {}", log.id))?;
    }
    Ok(())
}

/// `seed` command
pub async fn run_seed(
    db: &dyn DatabaseClient,
    hasher: &CredentialHasher,
    counts: SeedCounts,
    output: &Output,
) -> anyhow::Result<()> {
    output.header("Seeding demo data");

    output.step(1, 2, "Generating records");
    let data = generate(counts, hasher)?;

    output.step(2, 2, "Writing to the database");
    insert(db, &data).await?;

    output.newline();
    output.table_header(&["Collection", "Created"]);
    output.table_row(&["users", &data.users.len().to_string()]);
    output.table_row(&["animals", &data.animals.len().to_string()]);
    output.table_row(&["training_logs", &data.logs.len().to_string()]);

    if let Some((user, password)) = data.users.first() {
        output.hint(&format!(
            "Try it: POST /api/user/verify with {} / {}",
            user.email, password
        ));
    }
    output.complete("Seeding finished");
    Ok(())
}

/// `clear-db` command. Returns `false` if the user declined.
pub async fn run_clear(db: &dyn DatabaseClient, yes: bool, output: &Output) -> anyhow::Result<bool> {
    if !yes && !output.confirm("Delete every user, animal and training log?") {
        output.warning("Aborted; nothing was deleted");
        return Ok(false);
    }

    db.clear_all().await.context("Failed to clear the database")?;
    output.success("Cleared users, animals and training logs");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TursoClient;
    use crate::types::Page;
    use std::collections::HashSet;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::with_params(64, 1, 1).expect("valid params")
    }

    #[test]
    fn test_generate_references_are_valid() {
        let hasher = fast_hasher();
        let data = generate(
            SeedCounts {
                users: 3,
                animals: 5,
                logs: 8,
            },
            &hasher,
        )
        .expect("should generate");

        let user_ids: HashSet<_> = data.users.iter().map(|(u, _)| u.id.clone()).collect();
        let animal_ids: HashSet<_> = data.animals.iter().map(|a| a.id.clone()).collect();

        assert_eq!(data.users.len(), 3);
        assert!(data.animals.iter().all(|a| user_ids.contains(&a.owner)));
        assert!(data.animals.iter().all(|a| a.hours_trained >= 0.0));
        assert!(data.logs.iter().all(|l| animal_ids.contains(&l.animal)));
        assert!(data.logs.iter().all(|l| user_ids.contains(&l.user)));
        assert!(data.logs.iter().all(|l| l.hours > 0.0));
    }

    #[test]
    fn test_generated_passwords_verify() {
        let hasher = fast_hasher();
        let data = generate(
            SeedCounts {
                users: 2,
                animals: 0,
                logs: 0,
            },
            &hasher,
        )
        .expect("should generate");

        for (user, password) in &data.users {
            assert_ne!(&user.password_hash, password);
            assert!(hasher.verify(password, &user.password_hash));
        }
    }

    #[test]
    fn test_dependents_without_parents_rejected() {
        let hasher = fast_hasher();
        assert!(generate(SeedCounts { users: 0, animals: 1, logs: 0 }, &hasher).is_err());
        assert!(generate(SeedCounts { users: 1, animals: 0, logs: 1 }, &hasher).is_err());
        assert!(generate(SeedCounts { users: 0, animals: 0, logs: 0 }, &hasher).is_ok());
    }

    #[tokio::test]
    async fn test_seed_then_clear() {
        let db = TursoClient::new_memory().await.expect("db");
        let hasher = fast_hasher();
        let output = Output::no_color();

        run_seed(
            &db,
            &hasher,
            SeedCounts {
                users: 4,
                animals: 2,
                logs: 3,
            },
            &output,
        )
        .await
        .expect("should seed");

        let page = Page { count: 50, offset: 0 };
        assert_eq!(db.list_users(page).await.expect("list").len(), 4);
        assert_eq!(db.list_animals(page).await.expect("list").len(), 2);
        assert_eq!(db.list_training_logs(page).await.expect("list").len(), 3);

        assert!(run_clear(&db, true, &output).await.expect("should clear"));
        assert!(db.list_users(page).await.expect("list").is_empty());
        assert!(db.list_animals(page).await.expect("list").is_empty());
        assert!(db.list_training_logs(page).await.expect("list").is_empty());
    }
}
