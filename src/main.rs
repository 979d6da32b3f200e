use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use uuid::Uuid;

use vapekit::base::{self, BaseInput, BaseResult, BaseSettings};
use vapekit::battery::{self, BatteryChoice, ModInput, ModType};
use vapekit::coil::{self, CoilInput, CoilType};
use vapekit::config::{AppConfig, ConfigError};
use vapekit::cost::{self, Bottle, CostInput};
use vapekit::curve::ResistanceCurve;
use vapekit::mix::{FlavorEntry, MixPreset, MixSession, PresetBook, PresetError, SessionError};
use vapekit::nicotine::{self, NicotineInput, NicotineMode, NicotineResult, NicotineSettings};
use vapekit::reference::{BATTERIES, MATERIALS};
use vapekit::spool::{self, SpoolInput};
use vapekit::store::{JsonFileStore, KeyValueStore, StoreError};
use vapekit::units::VolumeUnit;
use vapekit::wiring::{self, WiringInput};
use vapekit::{logging, CalcError};

#[derive(Error, Debug)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Calc(#[from] CalcError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Calc(e) => Error::Calc(e),
            SessionError::Preset(e) => Error::Preset(e),
            SessionError::Store(e) => Error::Store(e),
        }
    }
}

/// Coil, nicotine, e-liquid and battery safety calculators
#[derive(Parser)]
#[command(name = "vapekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings store (overrides vapekit.toml and VAPEKIT_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log filter, e.g. debug
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Show liquid volumes in US fluid ounces
    #[arg(long, global = true)]
    fluid_ounces: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum CoilKind {
    Single,
    Clapton,
}

impl From<CoilKind> for CoilType {
    fn from(kind: CoilKind) -> Self {
        match kind {
            CoilKind::Single => CoilType::Single,
            CoilKind::Clapton => CoilType::Clapton,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Coil resistance from wire and former geometry
    Coil {
        #[arg(long = "type", value_enum, default_value_t = CoilKind::Single)]
        coil_type: CoilKind,
        #[arg(long, default_value_t = 1)]
        strands: u32,
        #[arg(long, default_value_t = 5.0)]
        wraps: f64,
        /// Core wire AWG
        #[arg(long, default_value_t = 30)]
        core_gauge: i32,
        /// Wrap wire AWG (Clapton only)
        #[arg(long, default_value_t = 40)]
        clapton_gauge: i32,
        /// mm
        #[arg(long, default_value_t = 3.0)]
        inner_diameter: f64,
        /// mm
        #[arg(long, default_value_t = 5.0)]
        leg_length: f64,
        #[arg(long, default_value = "ss316l")]
        material: String,
    },

    /// Nicotine supply
    Nic {
        #[command(subcommand)]
        mode: NicCommand,
    },

    /// E-liquid recipe for the current preset
    Mix {
        /// Flavors as vendor:name:percent
        flavors: Vec<FlavorEntry>,
        #[command(flatten)]
        preset: PresetArgs,
    },

    /// Manage mix presets
    Presets {
        #[command(subcommand)]
        action: PresetCommand,
    },

    /// Mod current draw and battery safety
    Mod {
        /// Coil resistance, ohms
        #[arg(long, default_value_t = 0.5)]
        resistance: f64,
        #[arg(long, default_value_t = 1)]
        series: u32,
        /// Regulated mod wattage; mechanical when absent
        #[arg(long)]
        wattage: Option<f64>,
        /// Regulator efficiency, percent
        #[arg(long, default_value_t = 95.0)]
        efficiency: f64,
        #[arg(long, default_value = "LG HG2")]
        battery: String,
        /// Custom cell capacity in mAh (with --current-limit)
        #[arg(long, requires = "current_limit")]
        capacity: Option<f64>,
        /// Custom cell continuous limit in amps (with --capacity)
        #[arg(long, requires = "capacity")]
        current_limit: Option<f64>,
        /// Safety margin, percent
        #[arg(long, default_value_t = 50.0)]
        margin: f64,
        /// Print the resistance sweep
        #[arg(long)]
        chart: bool,
    },

    /// Copper wire gauge for a given run
    Wiring {
        /// One-way length, metres
        #[arg(long, default_value_t = 0.1)]
        length: f64,
        #[arg(long, default_value_t = 0.25)]
        max_drop: f64,
        #[arg(long, default_value_t = 50.0)]
        max_rise: f64,
        #[arg(long, default_value_t = 30.0)]
        current: f64,
        /// List every gauge, not just the selection
        #[arg(long)]
        all: bool,
    },

    /// Wire left on a spool
    Spool {
        #[arg(long, default_value = "ss316l")]
        material: String,
        #[arg(long, default_value_t = 26)]
        gauge: i32,
        /// Empty spool mass, grams
        #[arg(long)]
        empty: f64,
        /// Current spool mass, grams
        #[arg(long)]
        current: f64,
    },

    /// How long VG and PG stocks last
    Base {
        /// mL per day (remembered)
        #[arg(long)]
        per_day: Option<f64>,
        /// VG percent (remembered)
        #[arg(long)]
        vg_ratio: Option<f64>,
        #[arg(long)]
        vg_volume: f64,
        #[arg(long)]
        pg_volume: f64,
    },

    /// Ingredient cost of a batch
    Cost(CostArgs),

    /// List resistance wire alloys and battery cells
    Materials,

    /// Import a temperature/resistance curve
    Curve {
        file: PathBuf,
        /// Temperatures (degF) to interpolate at
        #[arg(long = "at")]
        at: Vec<f64>,
    },
}

#[derive(Subcommand)]
enum NicCommand {
    /// Days a bottle of base lasts
    Lifetime {
        /// mL per day (remembered)
        #[arg(long)]
        per_day: Option<f64>,
        /// mg/mL vaped (remembered)
        #[arg(long)]
        concentration: Option<f64>,
        #[arg(long)]
        base_concentration: f64,
        /// mL of base on hand
        #[arg(long)]
        base_volume: f64,
    },
    /// Base needed for a number of days
    Target {
        #[arg(long)]
        per_day: Option<f64>,
        #[arg(long)]
        concentration: Option<f64>,
        #[arg(long)]
        days: f64,
    },
}

#[derive(Subcommand)]
enum PresetCommand {
    List,
    /// Copy the current preset and select the copy
    Duplicate { name: String },
    Rename { name: String },
    /// Remove a preset (the current one when no id is given)
    Remove { id: Option<Uuid> },
    Select { id: Uuid },
    /// Change fields of the current preset
    Set(PresetArgs),
}

#[derive(Args, Default)]
struct PresetArgs {
    #[arg(long)]
    batch_ml: Option<f64>,
    /// Batch VG percent
    #[arg(long)]
    batch_vg: Option<f64>,
    #[arg(long)]
    max_vg: Option<bool>,
    #[arg(long)]
    use_nic: Option<bool>,
    /// mg/mL wanted in the batch
    #[arg(long)]
    nic_strength: Option<f64>,
    #[arg(long)]
    nic_base_strength: Option<f64>,
    /// Nicotine base VG percent
    #[arg(long)]
    nic_base_vg: Option<f64>,
}

impl PresetArgs {
    fn apply(&self, preset: &MixPreset) -> MixPreset {
        MixPreset {
            batch_ml: self.batch_ml.unwrap_or(preset.batch_ml),
            batch_vg: self.batch_vg.unwrap_or(preset.batch_vg),
            max_vg: self.max_vg.unwrap_or(preset.max_vg),
            use_nic: self.use_nic.unwrap_or(preset.use_nic),
            nic_batch_strength: self.nic_strength.unwrap_or(preset.nic_batch_strength),
            nic_base_strength: self.nic_base_strength.unwrap_or(preset.nic_base_strength),
            nic_base_vg: self.nic_base_vg.unwrap_or(preset.nic_base_vg),
            ..preset.clone()
        }
    }
}

#[derive(Args)]
struct CostArgs {
    /// Batch size, mL
    #[arg(long, default_value_t = 1000.0)]
    total_volume: f64,
    #[arg(long, default_value_t = 6.0)]
    nic_desired: f64,
    #[arg(long, default_value_t = 250.0)]
    nic_base: f64,
    #[arg(long, default_value_t = 80.0)]
    nic_price: f64,
    #[arg(long, default_value_t = 125.0)]
    nic_bottle: f64,
    #[arg(long, default_value_t = 25.0)]
    vg_price: f64,
    #[arg(long, default_value_t = 3785.0)]
    vg_bottle: f64,
    #[arg(long, default_value_t = 35.0)]
    pg_price: f64,
    #[arg(long, default_value_t = 3785.0)]
    pg_bottle: f64,
    #[arg(long, default_value_t = 5.0)]
    flavor_price: f64,
    #[arg(long, default_value_t = 15.0)]
    flavor_bottle: f64,
    /// Percent of batch
    #[arg(long, default_value_t = 10.0)]
    flavor_pct: f64,
    /// Percent of batch
    #[arg(long, default_value_t = 50.0)]
    vg_pct: f64,
}

impl From<CostArgs> for CostInput {
    fn from(a: CostArgs) -> Self {
        CostInput {
            total_volume: a.total_volume,
            nicotine_strength_desired: a.nic_desired,
            nicotine_strength_base: a.nic_base,
            nicotine: Bottle::new(a.nic_price, a.nic_bottle),
            vg: Bottle::new(a.vg_price, a.vg_bottle),
            pg: Bottle::new(a.pg_price, a.pg_bottle),
            flavor: Bottle::new(a.flavor_price, a.flavor_bottle),
            flavor_pct: a.flavor_pct,
            vg_pct: a.vg_pct,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Calc(CalcError::Invalid(errors))) => {
            eprintln!("Invalid input:");
            for err in errors.iter() {
                eprintln!("  - {}", err);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut config = AppConfig::load()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.fluid_ounces {
        config.fluid_ounces = true;
    }
    logging::init(&config.log_level);
    tracing::debug!(?config, "configuration loaded");

    let unit: VolumeUnit = config.volume_unit();
    let open_store = || JsonFileStore::open(&config.store_path);

    match cli.command {
        Commands::Coil {
            coil_type,
            strands,
            wraps,
            core_gauge,
            clapton_gauge,
            inner_diameter,
            leg_length,
            material,
        } => {
            let r = coil::calculate(&CoilInput {
                coil_type: coil_type.into(),
                strands,
                wraps,
                core_gauge,
                clapton_gauge,
                inner_diameter_mm: inner_diameter,
                leg_length_mm: leg_length,
                material,
            })?;
            println!("Resistance:      {:.3} ohm", r.resistance);
            println!("Wire diameter:   {:.3} mm", r.wire_diameter);
            println!("Outer diameter:  {:.2} mm", r.outer_diameter);
            println!("Wire length:     {:.1} mm", r.length);
            println!("Cross section:   {:.4} mm^2", r.cross_section_area);
            println!("Surface area:    {:.1} mm^2", r.surface_area);
            println!("Ohms per metre:  {:.3}", r.resistivity_per_unit_length);
        }

        Commands::Nic { mode } => {
            let mut store = open_store()?;
            let saved = NicotineSettings::load(&store);
            let (mode, input) = match mode {
                NicCommand::Lifetime {
                    per_day,
                    concentration,
                    base_concentration,
                    base_volume,
                } => (
                    NicotineMode::Lifetime,
                    NicotineInput {
                        consumed_per_day: per_day.unwrap_or(saved.consumed_per_day),
                        consumed_concentration: concentration
                            .unwrap_or(saved.consumed_concentration),
                        base_concentration,
                        base_volume,
                        ..saved.to_input()
                    },
                ),
                NicCommand::Target {
                    per_day,
                    concentration,
                    days,
                } => (
                    NicotineMode::Target,
                    NicotineInput {
                        consumed_per_day: per_day.unwrap_or(saved.consumed_per_day),
                        consumed_concentration: concentration
                            .unwrap_or(saved.consumed_concentration),
                        desired_supply_days: days,
                        ..saved.to_input()
                    },
                ),
            };
            match calculate_nicotine(&mut store, &input, mode, unit)? {
                NicotineResult::Lifetime(r) => {
                    println!("Daily consumption: {:.1} mg", r.daily_consumption_mg);
                    println!("Total supply:      {:.1} mg", r.total_supply_mg);
                    println!("Lasts:             {} days", r.supply_duration_days);
                }
                NicotineResult::Target { volumes } => {
                    for v in volumes {
                        println!("{:>4} mg/mL: {:.1} {}", v.strength, v.volume, v.unit);
                    }
                }
            }
        }

        Commands::Mix { flavors, preset } => {
            let mut store = open_store()?;
            let mut session = MixSession::load(&store);
            session.flavors = flavors.into_iter().collect();
            let edited = preset.apply(session.presets.current());
            let result = session.submit(edited, &mut store)?;

            println!("Preset: {}", session.presets.current().name);
            println!(
                "{:<32} {:>7} {:>10} {:>9}",
                "Ingredient",
                "%",
                unit.symbol(),
                "g"
            );
            for item in &result.items {
                println!(
                    "{:<32} {:>7.2} {:>10.2} {:>9.2}",
                    item.name,
                    item.pct,
                    unit.from_ml(item.volume),
                    item.mass
                );
            }
        }

        Commands::Presets { action } => {
            let mut store = open_store()?;
            let mut book = PresetBook::load(&store);
            match action {
                PresetCommand::List => {}
                PresetCommand::Duplicate { name } => {
                    book.duplicate_current(&name)?;
                }
                PresetCommand::Rename { name } => book.rename_current(&name)?,
                PresetCommand::Remove { id } => {
                    let removed = match id {
                        Some(id) => book.remove(id)?,
                        None => book.remove_current()?,
                    };
                    println!("Removed {}", removed.name);
                }
                PresetCommand::Select { id } => book.select(id)?,
                PresetCommand::Set(args) => {
                    let edited = args.apply(book.current());
                    book.update(edited)?;
                }
            }
            book.save(&mut store)?;
            print_presets(&book);
        }

        Commands::Mod {
            resistance,
            series,
            wattage,
            efficiency,
            battery,
            capacity,
            current_limit,
            margin,
            chart,
        } => {
            let battery = match (capacity, current_limit) {
                (Some(capacity_mah), Some(current_limit)) => BatteryChoice::Custom {
                    capacity_mah,
                    current_limit,
                },
                _ => BatteryChoice::Named(battery),
            };
            let mod_type = match wattage {
                Some(wattage) => ModType::Regulated {
                    efficiency_pct: efficiency,
                    wattage,
                },
                None => ModType::Mechanical,
            };
            let r = battery::calculate(&ModInput {
                mod_type,
                resistance,
                series,
                battery,
                safety_margin_pct: margin,
            })?;
            println!("Voltage:   {:.1} V", r.voltage);
            println!("Current:   {:.2} A", r.current);
            println!("Runtime:   {:.0} min", r.runtime_minutes);
            println!(
                "Power:     {:.2} / {:.2} W [{}]",
                r.power, r.max_power, r.safety
            );
            println!("Headroom:  {:.2} A ({:.0}%)", r.headroom, r.margin_pct);
            println!("Limit at:  {:.3} ohm", r.danger_resistance);
            if let Some(margin_resistance) = r.margin_resistance {
                println!("Margin at: {:.3} ohm", margin_resistance);
            }
            if chart {
                for p in r.chart() {
                    println!("{:>6.2} ohm {:>8.2} A  {}", p.resistance, p.current, p.safety);
                }
            }
        }

        Commands::Wiring {
            length,
            max_drop,
            max_rise,
            current,
            all,
        } => {
            let input = WiringInput {
                wire_length: length,
                max_voltage_drop: max_drop,
                max_temp_rise: max_rise,
                max_current: current,
            };
            if all {
                for e in wiring::candidates(&input)? {
                    println!(
                        "{:>2} AWG {:>7.3} V {:>8.2} C {}",
                        e.gauge,
                        e.voltage_drop,
                        e.temp_rise,
                        if e.suitable { "ok" } else { "-" }
                    );
                }
            }
            let selected = wiring::calculate(&input)?;
            println!(
                "Use {} AWG: {:.3} V drop, {:.2} C rise at {} A",
                selected.gauge, selected.voltage_drop, selected.temp_rise, current
            );
        }

        Commands::Spool {
            material,
            gauge,
            empty,
            current,
        } => {
            let r = spool::calculate(&SpoolInput {
                material,
                gauge,
                empty_mass_g: empty,
                current_mass_g: current,
            })?;
            println!("Wire mass:   {:.2} g", r.wire_mass_g);
            println!("Wire volume: {:.3} cm^3", r.wire_volume_cm3);
            println!("Wire length: {:.2} m", r.wire_length_m);
        }

        Commands::Base {
            per_day,
            vg_ratio,
            vg_volume,
            pg_volume,
        } => {
            let mut store = open_store()?;
            let saved = BaseSettings::load(&store);
            let input = BaseInput {
                consumed_per_day: per_day.unwrap_or(saved.consumed_per_day),
                vg_ratio: vg_ratio.unwrap_or(saved.vg_ratio),
                vg_volume,
                pg_volume,
            };
            let r = calculate_base(&mut store, &input)?;
            println!("Your VG will last {:.0} days.", r.vg_days);
            println!("Your PG will last {:.0} days.", r.pg_days);
        }

        Commands::Cost(args) => {
            let r = cost::calculate(&args.into())?;
            for line in &r.lines {
                println!(
                    "{:<9} {:>6.1}% {:>9.1} mL  ${:>8.2} ({:.0}%)",
                    line.name, line.pct, line.volume, line.cost, line.cost_share
                );
            }
            println!("Total cost:  ${:.2}", r.total_cost);
            println!("Cost per mL: ${:.3}", r.cost_per_ml);
        }

        Commands::Materials => {
            println!(
                "{:<12} {:<22} {:>9} {:>7} {:>6}",
                "id", "name", "ohm mm2/m", "g/cm3", "J/gK"
            );
            for m in MATERIALS {
                println!(
                    "{:<12} {:<22} {:>9.3} {:>7.2} {:>6.2}",
                    m.id, m.name, m.resistivity, m.density, m.heat_capacity
                );
            }
            println!();
            for b in BATTERIES {
                println!("{:<14} {:>5} mAh {:>4} A", b.name, b.capacity_mah, b.current_limit);
            }
        }

        Commands::Curve { file, at } => {
            let curve = ResistanceCurve::load(&file).map_err(|source| Error::Io {
                path: file.clone(),
                source,
            })?;
            if curve.is_empty() {
                println!("No curve points found in {}", file.display());
                return Ok(());
            }
            for p in curve.points() {
                println!("{:>8.1} F {:>8.4}", p.temp, p.tcr);
            }
            for temp in at {
                if let Some(tcr) = curve.tcr_at(temp) {
                    println!("at {:.1} F: {:.4}", temp, tcr);
                }
            }
        }
    }

    Ok(())
}

/// Remembers the daily figures only once they produce a result
fn calculate_nicotine<S: KeyValueStore + ?Sized>(
    store: &mut S,
    input: &NicotineInput,
    mode: NicotineMode,
    unit: VolumeUnit,
) -> Result<NicotineResult, Error> {
    let result = nicotine::calculate(input, mode, unit)?;
    NicotineSettings::from(input).save(store)?;
    Ok(result)
}

fn calculate_base<S: KeyValueStore + ?Sized>(
    store: &mut S,
    input: &BaseInput,
) -> Result<BaseResult, Error> {
    let result = base::calculate(input)?;
    BaseSettings::from(input).save(store)?;
    Ok(result)
}

fn print_presets(book: &PresetBook) {
    let current = book.current_id();
    for p in book.presets() {
        let marker = if p.id == current { "*" } else { " " };
        let nic = if p.use_nic {
            format!("{} mg/mL", p.nic_batch_strength)
        } else {
            "no nic".to_string()
        };
        let vg = if p.max_vg {
            "max VG".to_string()
        } else {
            format!("{}% VG", p.batch_vg)
        };
        println!("{} {} {:<20} {} mL, {}, {}", marker, p.id, p.name, p.batch_ml, vg, nic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mix_flavors_parse() {
        let cli = Cli::parse_from([
            "vapekit",
            "mix",
            "TPA:Strawberry Ripe:5",
            "CAP:Vanilla Custard:3",
            "--batch-ml",
            "60",
        ]);
        match cli.command {
            Commands::Mix { flavors, preset } => {
                assert_eq!(flavors.len(), 2);
                assert_eq!(flavors[1].flavor, "Vanilla Custard");
                assert_eq!(preset.batch_ml, Some(60.0));
            }
            _ => panic!("expected mix"),
        }
    }

    #[test]
    fn test_preset_args_override_only_given_fields() {
        let base = MixPreset::default();
        let args = PresetArgs {
            batch_vg: Some(70.0),
            ..PresetArgs::default()
        };
        let edited = args.apply(&base);
        assert_eq!(edited.batch_vg, 70.0);
        assert_eq!(edited.batch_ml, base.batch_ml);
        assert_eq!(edited.id, base.id);
    }

    #[test]
    fn test_volume_unit_flag() {
        let cli = Cli::parse_from(["vapekit", "--fluid-ounces", "materials"]);
        assert!(cli.fluid_ounces);
        assert_eq!(VolumeUnit::Imperial.symbol(), "fl oz");
    }

    #[test]
    fn test_rejected_nicotine_keeps_saved_figures() {
        let mut store = vapekit::store::MemoryStore::new();
        let good = NicotineInput {
            consumed_per_day: 5.0,
            consumed_concentration: 6.0,
            base_concentration: 100.0,
            base_volume: 30.0,
            ..NicotineInput::default()
        };
        calculate_nicotine(&mut store, &good, NicotineMode::Lifetime, VolumeUnit::Metric).unwrap();

        let bad = NicotineInput {
            consumed_per_day: -5.0,
            ..good.clone()
        };
        assert!(matches!(
            calculate_nicotine(&mut store, &bad, NicotineMode::Lifetime, VolumeUnit::Metric),
            Err(Error::Calc(_))
        ));
        let saved = NicotineSettings::load(&store);
        assert_eq!(saved.consumed_per_day, 5.0);
        assert_eq!(saved.consumed_concentration, 6.0);
    }

    #[test]
    fn test_rejected_base_keeps_saved_figures() {
        let mut store = vapekit::store::MemoryStore::new();
        let good = BaseInput {
            consumed_per_day: 10.0,
            vg_ratio: 70.0,
            vg_volume: 1000.0,
            pg_volume: 500.0,
        };
        calculate_base(&mut store, &good).unwrap();

        let bad = BaseInput {
            vg_ratio: 120.0,
            ..good
        };
        assert!(matches!(
            calculate_base(&mut store, &bad),
            Err(Error::Calc(_))
        ));
        let saved = BaseSettings::load(&store);
        assert_eq!(saved.consumed_per_day, 10.0);
        assert_eq!(saved.vg_ratio, 70.0);
    }
}
