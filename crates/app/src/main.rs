mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "organizze_bot={level},telegram_bot={level},organizze={level}",
            level = settings.app.level
        ))
        .init();

    tracing::info!("Found telegram settings...");
    let bot = telegram_bot::Bot::builder()
        .token(&settings.telegram.token)
        .allowed_chat_ids(settings.telegram.allowed_chat_ids)
        .organizze(&settings.organizze.email, &settings.organizze.api_key)
        .assistant(&settings.assistant.api_key, settings.assistant.model)
        .build()?;

    bot.run().await;

    Ok(())
}
