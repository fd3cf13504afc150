use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use provinces::province::growth::{CellGrid, grow_provinces};
use provinces::province::png::ProvinceMap;
use provinces::{
    FixedDelay, LandClassifier, NoiseTerrain, ProvinceRegistry, ProvinceStore, ProvincesConfig,
    SpatialPlacer, ValidationJob, ValidationJobController,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Разметка мира на провинции и проверка суши/моря
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// JSON-файл с провинциями
    #[arg(short, long, default_value = "provinces.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Размещает провинции, заполняет их ячейками и сохраняет
    Generate {
        /// Сохранить карту провинций в PNG
        #[arg(long)]
        png: Option<PathBuf>,
    },
    /// Классифицирует провинции как сушу или море
    Validate {
        /// Сохранить карту провинций в PNG после проверки
        #[arg(long)]
        png: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ProvincesConfig::from_toml_file(&cli.config)?;
    let grid = CellGrid::from_bounds(&config.world.bounds(), config.world.cell_size);

    match cli.command {
        Command::Generate { png } => {
            let mut store = ProvinceRegistry::with_path(&cli.data);
            let mut rng = match config.generation.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let created =
                SpatialPlacer::from_config(&config).generate_province_homes(&mut store, &mut rng)?;
            grow_provinces(&mut store, &grid);
            store.persist_all()?;
            println!("Создано провинций: {created}, сохранено в {:?}", cli.data);
            if let Some(path) = png {
                save_png(&grid, &store, &path)?;
            }
        }
        Command::Validate { png } => {
            let store = Mutex::new(ProvinceRegistry::load(&cli.data)?);
            let pacing = Arc::new(FixedDelay::new(config.land_validation.sample_delay()));
            tracing::info!(
                target: "provinces::validation",
                sample_count = config.land_validation.sample_count,
                delay_ms = pacing.delay().as_millis() as u64,
                "land validation pacing"
            );
            let job = ValidationJob::new(
                Arc::new(ValidationJobController::new()),
                LandClassifier::new(
                    config.land_validation.sample_count,
                    config.world.cell_size,
                    pacing,
                ),
                NoiseTerrain::new(&config.terrain),
            );
            let report = job.run_until_settled(&store)?;
            let store = store.into_inner();
            let sea = store.iter().filter(|p| p.is_sea).count();
            println!(
                "Проверка завершена ({:?}): {} провинций, из них морских {}, пропущено {}",
                report.outcome,
                report.total,
                sea,
                report.skipped.len()
            );
            if let Some(path) = png {
                save_png(&grid, &store, &path)?;
            }
        }
    }
    Ok(())
}

fn save_png(
    grid: &CellGrid,
    store: &ProvinceRegistry,
    path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let provinces = store.all_provinces();
    let map = ProvinceMap::from_provinces(*grid, &provinces);
    map.save_as_png(&provinces, &path.to_string_lossy())?;
    println!("Карта сохранена в {path:?}");
    Ok(())
}
