use anyhow::{Context, Result};
use clap::Parser;
use combo_input::config::Config;
use combo_input::services::player_controller::AnimatorParams;
use combo_input::services::{create_input_source, Dispatcher, FrameClock, InputSource, PlayerController};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "combo-input")]
#[command(about = "Покадровое разрешение ввода в действия и мульти-тап комбинации")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "combo.toml")]
    config: String,

    /// Уровень логирования (перекрывает logging.filter из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Фиксированный шаг кадра из timing.frame_ms вместо реального времени
    #[arg(long)]
    fixed_step: bool,

    /// Остановиться после указанного числа кадров
    #[arg(long)]
    max_frames: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_exists = Path::new(&args.config).exists();
    let config = if config_exists {
        Config::load(&args.config)?
    } else {
        Config::default()
    };

    // Инициализация системы логирования
    let directive = args.log_level.clone().unwrap_or_else(|| {
        if config.logging.filter.is_empty() {
            config.logging.level.clone()
        } else {
            config.logging.filter.clone()
        }
    });
    init_tracing(&directive, &config.logging.format)?;

    info!("Запуск combo-input v{}", env!("CARGO_PKG_VERSION"));
    if config_exists {
        info!("Конфигурация загружена из: {}", args.config);
    } else {
        warn!("Файл {} не найден - используется конфигурация по умолчанию", args.config);
    }

    // Инициализация компонентов
    let mut dispatcher =
        Dispatcher::from_config(&config).context("Не удалось построить таблицу действий")?;
    let player = Arc::new(Mutex::new(PlayerController::new(1.0, 3.0)));
    bind_handlers(&mut dispatcher, &player)?;

    let bound = config.get_bound_keys();
    for (_, name) in dispatcher.keys().iter() {
        if !bound.contains(name) {
            info!("Клавиша '{}' без привязок - доступна только как ввод", name);
        }
    }

    let source = create_input_source(&config, dispatcher.keys().clone(), dispatcher.injector())?;
    let clock = if args.fixed_step {
        FrameClock::fixed(config.frame_duration())
    } else {
        FrameClock::measured(config.frame_duration() * 10)
    };

    info!("Все компоненты инициализированы");

    let mut frame_loop = tokio::spawn(run_frames(
        dispatcher,
        source,
        player,
        clock,
        config.frame_duration(),
        args.max_frames,
    ));

    // Ожидание завершения скрипта или сигнала
    tokio::select! {
        result = &mut frame_loop => {
            match result {
                Ok(Ok(frames)) => info!("Цикл кадров завершён после {} кадров", frames),
                Ok(Err(e)) => {
                    error!("Ошибка в цикле кадров: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    error!("Задача цикла кадров прервана: {}", e);
                    return Err(e.into());
                }
            }
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            frame_loop.abort();
        }
    }

    info!("combo-input завершил работу");
    Ok(())
}

/// Каждое действие логируется; известные имена дополнительно управляют персонажем
fn bind_handlers(dispatcher: &mut Dispatcher, player: &Arc<Mutex<PlayerController>>) -> Result<()> {
    let actions: Vec<_> = dispatcher
        .registry()
        .iter()
        .map(|(id, spec)| (id, spec.name.clone()))
        .collect();

    for (id, name) in actions {
        let label = name.clone();
        dispatcher.subscribe(id, move || {
            debug!("Действие: {}", label);
            Ok(())
        })?;

        if let Some(handler) = PlayerController::handler(player, &name) {
            dispatcher.subscribe(id, handler)?;
        } else {
            debug!("Действие '{}' не управляет персонажем", name);
        }
    }
    Ok(())
}

async fn run_frames(
    mut dispatcher: Dispatcher,
    mut source: Box<dyn InputSource + Send>,
    player: Arc<Mutex<PlayerController>>,
    mut clock: FrameClock,
    frame: Duration,
    max_frames: Option<u64>,
) -> combo_input::Result<u64> {
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_params = AnimatorParams::default();

    loop {
        ticker.tick().await;
        let delta = clock.tick();

        player.lock().begin_frame(delta);
        let report = dispatcher.step(source.as_mut(), delta)?;
        let params = player.lock().end_frame();

        if !report.is_quiet() {
            let names: Vec<&str> = report
                .invoked
                .iter()
                .filter_map(|id| dispatcher.registry().spec(*id))
                .map(|spec| spec.name.as_str())
                .collect();
            debug!("Кадр {}: вызваны {:?}, закрыто окон: {}", report.frame, names, report.resolved_windows);
        }

        if params != last_params {
            info!(
                "Кадр {}: аниматор speed={} jump={} direction={} (пройдено {:.2})",
                report.frame,
                params.speed,
                params.jump,
                params.direction,
                player.lock().distance()
            );
            last_params = params;
        }

        // Конечный скрипт: дожидаемся закрытия окон; Release-записи отпущенных
        // клавиш без нового нажатия уже не сработают
        if source.is_finished() && dispatcher.is_settled() {
            if !dispatcher.running().is_empty() {
                debug!("Не сработавших Release-действий: {}", dispatcher.running().len());
            }
            info!("Скрипт ввода исчерпан");
            break;
        }
        if max_frames.is_some_and(|max| dispatcher.frame() >= max) {
            info!("Достигнут лимит кадров: {}", dispatcher.frame());
            break;
        }
    }

    Ok(dispatcher.frame())
}

fn init_tracing(directive: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
