//! Physical and economic units.
//!
//! Every unit is stored as a scale (and, for temperatures, an offset)
//! relative to a base unit of its [`Dimension`]: metre, kilogram, second,
//! kelvin, ampere, and US dollar. Conversion goes through the base unit.

use dew_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Dimension
// ============================================================================

/// Exponents over the base quantities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub temperature: i8,
    pub current: i8,
    pub currency: i8,
}

impl Dimension {
    pub const NONE: Dimension = Dimension::new(0, 0, 0, 0, 0, 0);
    pub const LENGTH: Dimension = Dimension::new(1, 0, 0, 0, 0, 0);
    pub const MASS: Dimension = Dimension::new(0, 1, 0, 0, 0, 0);
    pub const TIME: Dimension = Dimension::new(0, 0, 1, 0, 0, 0);
    pub const TEMPERATURE: Dimension = Dimension::new(0, 0, 0, 1, 0, 0);
    pub const CURRENT: Dimension = Dimension::new(0, 0, 0, 0, 1, 0);
    pub const CURRENCY: Dimension = Dimension::new(0, 0, 0, 0, 0, 1);

    pub const fn new(
        length: i8,
        mass: i8,
        time: i8,
        temperature: i8,
        current: i8,
        currency: i8,
    ) -> Self {
        Self {
            length,
            mass,
            time,
            temperature,
            current,
            currency,
        }
    }

    pub const fn times(self, other: Dimension) -> Dimension {
        Dimension::new(
            self.length + other.length,
            self.mass + other.mass,
            self.time + other.time,
            self.temperature + other.temperature,
            self.current + other.current,
            self.currency + other.currency,
        )
    }

    pub const fn per(self, other: Dimension) -> Dimension {
        Dimension::new(
            self.length - other.length,
            self.mass - other.mass,
            self.time - other.time,
            self.temperature - other.temperature,
            self.current - other.current,
            self.currency - other.currency,
        )
    }

    pub const fn raised(self, n: i8) -> Dimension {
        Dimension::new(
            self.length * n,
            self.mass * n,
            self.time * n,
            self.temperature * n,
            self.current * n,
            self.currency * n,
        )
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Dimension::NONE
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            ("L", self.length),
            ("M", self.mass),
            ("T", self.time),
            ("Θ", self.temperature),
            ("I", self.current),
            ("$", self.currency),
        ]
        .into_iter()
        .filter(|(_, e)| *e != 0)
        .map(|(s, e)| if e == 1 { s.to_string() } else { format!("{s}^{e}") })
        .collect();
        if parts.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", parts.join("·"))
        }
    }
}

const AREA: Dimension = Dimension::LENGTH.raised(2);
const VOLUME: Dimension = Dimension::LENGTH.raised(3);
const VELOCITY: Dimension = Dimension::LENGTH.per(Dimension::TIME);
const FLOW: Dimension = VOLUME.per(Dimension::TIME);
const FORCE: Dimension = Dimension::MASS.times(Dimension::LENGTH).per(Dimension::TIME.raised(2));
const PRESSURE: Dimension = FORCE.per(AREA);
const ENERGY: Dimension = FORCE.times(Dimension::LENGTH);
const POWER: Dimension = ENERGY.per(Dimension::TIME);
const CONDUCTIVITY: Dimension = Dimension::new(-3, -1, 3, 0, 2, 0);

// ============================================================================
// Unit
// ============================================================================

/// A unit with its conversion to the base unit of its dimension.
///
/// `base = value * scale + offset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub dimension: Dimension,
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
}

impl Unit {
    pub fn new(id: &str, symbol: &str, name: &str, dimension: Dimension, scale: f64) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension,
            scale,
            offset: 0.0,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Human-readable label: the symbol, or `"dimensionless"`.
    pub fn display(&self) -> &str {
        if self.symbol.is_empty() {
            "dimensionless"
        } else {
            &self.symbol
        }
    }

    /// LaTeX rendering of the symbol.
    pub fn latex(&self) -> String {
        if self.symbol.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        for c in self.symbol.chars() {
            match c {
                '²' => out.push_str("^{2}"),
                '³' => out.push_str("^{3}"),
                '°' => out.push_str(r"^{\circ}"),
                '%' => out.push_str(r"\%"),
                '$' => out.push_str(r"\$"),
                '·' => out.push_str(r"\cdot "),
                _ => out.push(c),
            }
        }
        format!(r"\mathrm{{{out}}}")
    }

    fn to_base(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    fn from_base(&self, value: f64) -> f64 {
        (value - self.offset) / self.scale
    }
}

// ============================================================================
// Scale constants (base units: m, kg, s, K, A, $)
// ============================================================================

const INCH: f64 = 0.0254;
const FOOT: f64 = 0.3048;
const LITER: f64 = 1e-3;
const GALLON: f64 = 3.79 * LITER;
const ACRE: f64 = 43560.0 * FOOT * FOOT;
const ACRE_INCH: f64 = 27154.0 * GALLON;
const ACRE_FOOT: f64 = ACRE * FOOT;
const MINUTE: f64 = 60.0;
const HOUR: f64 = 3600.0;
const DAY: f64 = 86400.0;
const YEAR: f64 = 365.25 * DAY;
const POUND_MASS: f64 = 0.453_592_37;
const POUND_FORCE: f64 = 4.448_221_615_260_5;
const PSI: f64 = POUND_FORCE / (INCH * INCH);
const HECTARE: f64 = 1e4;
const BUSHEL: f64 = 0.035_239_07;
const KWH: f64 = 3.6e6;

// ============================================================================
// Registry
// ============================================================================

/// Identifier of the dimensionless unit.
pub const DIMENSIONLESS: &str = "dimensionless_unit";

/// Units indexed by id and alias.
#[derive(Clone, Debug, Default)]
pub struct UnitRegistry {
    units: Vec<Unit>,
    index: HashMap<String, usize>,
}

impl UnitRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unit used by the built-in domains and annotation templates.
    pub fn builtin() -> Self {
        let mut r = Self::new();
        let d = Dimension::NONE;

        // Dimensionless and economic
        r.insert(Unit::new(DIMENSIONLESS, "", "dimensionless", d, 1.0), &["dimensionless"]);
        r.insert(Unit::new("percentage", "%", "percent", d, 0.01), &["percent", "%"]);
        r.insert(Unit::new("ppm", "ppm", "parts per million", d, 1e-6), &["parts_per_million"]);
        r.insert(Unit::new("dollar", "$", "dollar", Dimension::CURRENCY, 1.0), &["$", "usd"]);

        // Length
        let l = Dimension::LENGTH;
        r.insert(Unit::new("millimeter", "mm", "millimeter", l, 1e-3), &["mm", "water_depth_in_mm_unit"]);
        r.insert(Unit::new("centimeter", "cm", "centimeter", l, 1e-2), &["cm"]);
        r.insert(Unit::new("meter", "m", "meter", l, 1.0), &["m"]);
        r.insert(Unit::new("inches", "in", "inch", l, INCH), &["inch", "in"]);
        r.insert(Unit::new("feet", "ft", "foot", l, FOOT), &["foot", "ft"]);

        // Area
        r.insert(Unit::new("square_inch", "in²", "square inch", AREA, INCH * INCH), &["in2"]);
        r.insert(Unit::new("square_foot", "ft²", "square foot", AREA, FOOT * FOOT), &["ft2"]);
        r.insert(Unit::new("square_meter", "m²", "square meter", AREA, 1.0), &["m2"]);
        r.insert(Unit::new("acres", "ac", "acre", AREA, ACRE), &["acre", "ac"]);
        r.insert(Unit::new("hectare", "ha", "hectare", AREA, HECTARE), &["ha"]);

        // Volume
        r.insert(Unit::new("liter", "L", "liter", VOLUME, LITER), &["L"]);
        r.insert(Unit::new("milliliter", "mL", "milliliter", VOLUME, 1e-6), &["mL"]);
        r.insert(Unit::new("cubic_centimeter", "cm³", "cubic centimeter", VOLUME, 1e-6), &["cm3"]);
        r.insert(Unit::new("cubic_meter", "m³", "cubic meter", VOLUME, 1.0), &["m3"]);
        r.insert(Unit::new("gallon", "gal", "gallon", VOLUME, GALLON), &["gal"]);
        r.insert(Unit::new("acre_inch", "ac-in", "acre-inch", VOLUME, ACRE_INCH), &["ac-in"]);
        r.insert(Unit::new("acre_foot", "ac-ft", "acre-foot", VOLUME, ACRE_FOOT), &["ac-ft"]);

        // Flow
        r.insert(Unit::new("gallon_per_minute", "gpm", "gallons per minute", FLOW, 0.06309 * LITER), &["gpm"]);
        r.insert(Unit::new("gallon_per_hour", "gal/h", "gallons per hour", FLOW, GALLON / HOUR), &["gal/h"]);
        r.insert(Unit::new("cubic_foot_per_second", "cfs", "cubic feet per second", FLOW, 0.02832), &["cfs"]);
        r.insert(Unit::new("acre_inch_per_hour", "ac-in/hr", "acre-inches per hour", FLOW, 0.02832), &["ac-in/hr", "ac-in/h"]);
        r.insert(Unit::new("acre_inch_per_day", "ac-in/day", "acre-inches per day", FLOW, ACRE_INCH / DAY), &["ac-in/day"]);
        r.insert(Unit::new("feet_cubed_per_hour", "ft³/h", "cubic feet per hour", FLOW, FOOT.powi(3) / HOUR), &["ft3/h"]);
        r.insert(Unit::new("acreft_per_year", "ac-ft/yr", "acre-feet per year", FLOW, ACRE_FOOT / YEAR), &["ac-ft/yr"]);

        // Depth rates and velocities
        r.insert(Unit::new("inch_per_hour", "in/h", "inches per hour", VELOCITY, INCH / HOUR), &["in/h", "in/hr"]);
        r.insert(Unit::new("inch_per_day", "in/day", "inches per day", VELOCITY, INCH / DAY), &["in/day"]);
        r.insert(Unit::new("feet_per_second", "ft/s", "feet per second", VELOCITY, FOOT), &["ft/s"]);
        r.insert(Unit::new("mm_per_day", "mm/day", "millimeters per day", VELOCITY, 1e-3 / DAY), &["mm/day", "reference_et_in_mm_per_day_unit"]);
        r.insert(Unit::new("mm_per_month", "mm/month", "millimeters per month", VELOCITY, 1e-3 / (30.0 * DAY)), &["mm/month", "reference_et_in_mm_per_month_unit"]);
        r.insert(Unit::new("ac-in/ac/yr", "ac-in/ac/yr", "acre-inches per acre per year", VELOCITY, ACRE_INCH / ACRE / YEAR), &[]);
        r.insert(Unit::new("gpm_per_acre", "gpm/ac", "gallons per minute per acre", VELOCITY, 0.06309 * LITER / ACRE), &["gpm/ac"]);
        r.insert(Unit::new("gpm_per_square_foot", "gpm/ft²", "gallons per minute per square foot", VELOCITY, 0.06309 * LITER / (FOOT * FOOT)), &["gpm/ft2"]);

        // Pressure
        r.insert(Unit::new("pascal", "Pa", "pascal", PRESSURE, 1.0), &["Pa"]);
        r.insert(Unit::new("kilopascal", "kPa", "kilopascal", PRESSURE, 1e3), &["kPa"]);
        r.insert(Unit::new("bar", "bar", "bar", PRESSURE, 1e5), &[]);
        r.insert(Unit::new("centibar", "cb", "centibar", PRESSURE, 1e3), &["cb"]);
        r.insert(Unit::new("psi", "psi", "pounds per square inch", PRESSURE, PSI), &[]);
        r.insert(Unit::new("lb/in²", "lb/in²", "pounds per square inch", PRESSURE, PSI), &["lb/in2"]);
        r.insert(Unit::new("psi_per_foot", "psi/ft", "psi per foot", PRESSURE.per(Dimension::LENGTH), PSI / FOOT), &["psi/ft"]);

        // Power and energy
        r.insert(Unit::new("watt", "W", "watt", POWER, 1.0), &["W"]);
        r.insert(Unit::new("kilowatt", "kW", "kilowatt", POWER, 1e3), &["kW"]);
        r.insert(Unit::new("horsepower", "hp", "horsepower", POWER, 33000.0 * FOOT * POUND_FORCE / MINUTE), &["hp"]);
        r.insert(Unit::new("kWh", "kWh", "kilowatt-hour", ENERGY, KWH), &["kilowatt_hour"]);
        r.insert(Unit::new("kWh/yr", "kWh/yr", "kilowatt-hours per year", POWER, KWH / YEAR), &[]);

        // Time
        let t = Dimension::TIME;
        r.insert(Unit::new("seconds", "s", "second", t, 1.0), &["second", "s"]);
        r.insert(Unit::new("minutes", "min", "minute", t, MINUTE), &["minute", "min"]);
        r.insert(Unit::new("hours", "h", "hour", t, HOUR), &["hour", "h"]);
        r.insert(Unit::new("days", "day", "day", t, DAY), &["day"]);
        r.insert(Unit::new("years", "yr", "year", t, YEAR), &["year", "yr"]);

        // Temperature
        let k = Dimension::TEMPERATURE;
        r.insert(Unit::new("kelvin", "K", "kelvin", k, 1.0), &["K"]);
        r.insert(Unit::new("celsius", "°C", "degree Celsius", k, 1.0).with_offset(273.15), &["°C"]);

        // Mass and concentration
        let m = Dimension::MASS;
        r.insert(Unit::new("gram", "g", "gram", m, 1e-3), &["g"]);
        r.insert(Unit::new("kilogram", "kg", "kilogram", m, 1.0), &["kg"]);
        r.insert(Unit::new("ton", "ton", "metric ton", m, 1e3), &["tons"]);
        r.insert(Unit::new("pound", "lb", "pound", m, POUND_MASS), &["lb"]);
        r.insert(Unit::new("mg/L", "mg/L", "milligrams per liter", m.per(VOLUME), 1e-3), &[]);
        r.insert(Unit::new("dS/m", "dS/m", "decisiemens per meter", CONDUCTIVITY, 0.1), &[]);

        // Yield and application rates
        r.insert(Unit::new("bu/ac", "bu/ac", "bushels per acre", VOLUME.per(AREA), BUSHEL / ACRE), &[]);
        r.insert(Unit::new("lb/ac", "lb/ac", "pounds per acre", m.per(AREA), 1.12 / HECTARE), &[]);

        r
    }

    /// Add a unit under its id and the given aliases.
    ///
    /// A later unit with the same id or alias replaces the earlier mapping.
    pub fn insert(&mut self, unit: Unit, aliases: &[&str]) {
        let idx = self.units.len();
        self.index.insert(unit.id.clone(), idx);
        for alias in aliases {
            self.index.insert((*alias).to_string(), idx);
        }
        self.units.push(unit);
    }

    /// Look up a unit by id or alias.
    pub fn get(&self, id: &str) -> Option<&Unit> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    /// Look up a unit, failing with `NotFound`.
    pub fn require(&self, id: &str) -> Result<&Unit> {
        self.get(id).ok_or_else(|| Error::not_found("unit", id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Display label for a unit id; unknown ids are returned unchanged.
    pub fn display(&self, id: &str) -> String {
        self.get(id)
            .map(|u| u.display().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// All registered units in insertion order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Convert `value` between two units of the same dimension.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64> {
        let from_unit = self.require(from)?;
        let to_unit = self.require(to)?;
        if from_unit.dimension != to_unit.dimension {
            return Err(Error::validation(format!(
                "cannot convert {} ({}) to {} ({}): incompatible dimensions",
                from_unit.display(),
                from_unit.dimension,
                to_unit.display(),
                to_unit.dimension
            )));
        }
        Ok(to_unit.from_base(from_unit.to_base(value)))
    }
}
