use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;
use dialoguer::Confirm;
use serde_json::json;
use trashmon::collection::{CollectionStore, JsonCollectionStore};
use trashmon::{cli, config, session, workflow};
use cli::{Cli, CollectionAction, Commands, OrderArg};
use config::Config;
use tracing_subscriber::EnvFilter;
use trashmon_common::guide_for_label;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Capture { source, name, release, demo, order } => {
            println!("📸 trashmon - 몬스터 포획\n");

            let order = match order {
                Some(OrderArg::GuideFirst) => workflow::GuideOrder::GuideFirst,
                Some(OrderArg::NameFirst) => workflow::GuideOrder::NameFirst,
                None => config.guide_order,
            };
            let opts = session::SessionOptions { source, name, release, demo, order };
            session::run_capture_session(&config, &opts).await?;
        }

        Commands::Collection { action } => {
            let data_dir = config.data_dir()?;
            let mut store = JsonCollectionStore::open(&data_dir)?;

            match action {
                CollectionAction::List { json } => {
                    let items = store.get_all()?;
                    if json {
                        let summary: Vec<_> = items
                            .iter()
                            .map(|i| {
                                json!({
                                    "id": i.id,
                                    "category": i.category,
                                    "monsterName": i.monster_name,
                                    "rank": i.rank,
                                    "capturedAt": i.captured_at,
                                    "imageBytes": i.monster_image.len(),
                                })
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    } else if items.is_empty() {
                        println!("도감이 비어 있어요. `trashmon capture` 로 몬스터를 잡아보세요!");
                    } else {
                        println!("📚 도감 ({}마리)", items.len());
                        for item in &items {
                            println!(
                                "  #{:<4} [{}] {:<10} {:<6} {}",
                                item.id,
                                item.rank,
                                item.monster_name,
                                item.category,
                                item.captured_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                            );
                        }
                    }
                }

                CollectionAction::Show { id, export } => {
                    let Some(item) = store.get(id)? else {
                        bail!(trashmon::error::TrashmonError::NotFound(id));
                    };
                    println!("#{} {}", item.id, item.monster_name);
                    println!("  분류: {}", item.category);
                    println!("  랭크: {}", item.rank);
                    println!("  잡은 날: {}", item.captured_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
                    if let Some(path) = export {
                        std::fs::write(&path, &item.monster_image)?;
                        println!("✔ 이미지를 저장했어요: {}", path.display());
                    }
                }

                CollectionAction::Rename { id, name } => {
                    store.rename(id, &name)?;
                    println!("✔ #{} 의 이름을 '{}' 로 바꿨어요", id, name.trim());
                }

                CollectionAction::Clear { yes } => {
                    let confirmed = yes
                        || Confirm::new()
                            .with_prompt(format!("도감의 몬스터 {}마리를 모두 지울까요?", store.len()))
                            .default(false)
                            .interact()?;
                    if confirmed {
                        store.clear()?;
                        println!("✔ 도감을 비웠어요: {}", store.path().display());
                    } else {
                        println!("취소했어요");
                    }
                }
            }
        }

        Commands::Guide { category } => {
            let guide = guide_for_label(&category)?;
            println!("🌱 {} 분리수거 방법", guide.category);
            println!("  {} 분리수거함, {}", guide.bin_color, guide.message);
            for (i, tip) in guide.tips.iter().enumerate() {
                println!("  {}. {}", i + 1, tip);
            }
        }

        Commands::Config { set_api_url, demo_mode, show } => {
            let mut config = config;
            let changed = set_api_url.is_some() || demo_mode.is_some();

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ 분류 서버 주소를 설정했어요");
            }
            if let Some(toggle) = demo_mode {
                config.demo_mode = toggle.enabled();
                println!("✔ 데모 모드: {}", if config.demo_mode { "켜짐" } else { "꺼짐" });
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("설정:");
                println!("  서버 주소: {}", config.effective_api_url());
                println!("  데모 모드: {}", if config.demo_mode { "켜짐" } else { "꺼짐" });
                println!("  순서: {:?}", config.guide_order);
                println!("  최대 이미지 크기: {}px", config.max_image_size);
                match config.data_dir() {
                    Ok(dir) => println!("  도감 위치: {}", dir.display()),
                    Err(e) => println!("  도감 위치: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
