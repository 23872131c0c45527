use goose::prelude::*;
use std::env;

fn base_path() -> String {
    env::var("BASE_PATH").unwrap_or_else(|_| "/idp".to_string())
}

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get(&format!("{}/health", base_path())).await?;
    Ok(())
}

async fn consent_landing(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get(&format!("{}/consent", base_path())).await?;
    Ok(())
}

async fn login_without_challenge(user: &mut GooseUser) -> TransactionResult {
    let path = format!("{}/login", base_path());
    let mut goose = user.get(&path).await?;

    // A missing challenge is answered with 400; anything else is a failure.
    if let Ok(response) = &goose.response {
        if response.status().as_u16() == 400 {
            return user.set_success(&mut goose.request);
        } else {
            return user.set_failure(
                "expected 400 without login_challenge",
                &mut goose.request,
                None,
                None,
            );
        }
    }
    Ok(())
}

async fn login_with_challenge(user: &mut GooseUser) -> TransactionResult {
    let Ok(challenge) = env::var("LOGIN_CHALLENGE") else {
        return Ok(());
    };
    let path = format!("{}/login?login_challenge={challenge}", base_path());
    let _goose_metrics = user.get(&path).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    println!("Base path for provider calls: {}", base_path());
    if env::var("LOGIN_CHALLENGE").is_err() {
        println!("No LOGIN_CHALLENGE environment variable set, skipping login page renders");
    }

    GooseAttack::initialize()?
        .register_scenario(
            scenario!("HealthCheck").register_transaction(transaction!(health_check)),
        )
        .register_scenario(
            scenario!("ProviderPages")
                .register_transaction(transaction!(consent_landing))
                .register_transaction(transaction!(login_without_challenge))
                .register_transaction(transaction!(login_with_challenge)),
        )
        .execute()
        .await?;

    Ok(())
}
