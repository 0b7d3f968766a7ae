//! Unit conversion across physical categories

use serde::Serialize;

use super::ToolError;

/// How a unit relates to its category's base unit
#[derive(Debug, Clone, Copy)]
enum Scale {
    /// `base = value * factor`
    Factor(f64),
    Celsius,
    Fahrenheit,
    Kelvin,
    /// `base = k / value`
    Reciprocal(f64),
}

impl Scale {
    fn to_base(self, value: f64) -> f64 {
        match self {
            Scale::Factor(f) => value * f,
            Scale::Celsius => value,
            Scale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Scale::Kelvin => value - 273.15,
            Scale::Reciprocal(k) => k / value,
        }
    }

    fn from_base(self, base: f64) -> f64 {
        match self {
            Scale::Factor(f) => base / f,
            Scale::Celsius => base,
            Scale::Fahrenheit => base * 9.0 / 5.0 + 32.0,
            Scale::Kelvin => base + 273.15,
            Scale::Reciprocal(k) => k / base,
        }
    }
}

struct Category {
    name: &'static str,
    base: &'static str,
    units: &'static [(&'static str, Scale)],
}

use self::Scale::Factor;

const KIB: f64 = 1024.0;

static CATEGORIES: &[Category] = &[
    Category {
        name: "length",
        base: "meter",
        units: &[
            ("nanometer", Factor(1e-9)),
            ("micrometer", Factor(1e-6)),
            ("millimeter", Factor(0.001)),
            ("centimeter", Factor(0.01)),
            ("meter", Factor(1.0)),
            ("kilometer", Factor(1000.0)),
            ("inch", Factor(0.0254)),
            ("foot", Factor(0.3048)),
            ("yard", Factor(0.9144)),
            ("mile", Factor(1609.344)),
            ("nautical_mile", Factor(1852.0)),
        ],
    },
    Category {
        name: "area",
        base: "square_meter",
        units: &[
            ("square_millimeter", Factor(1e-6)),
            ("square_centimeter", Factor(0.0001)),
            ("square_meter", Factor(1.0)),
            ("square_kilometer", Factor(1e6)),
            ("square_inch", Factor(0.00064516)),
            ("square_foot", Factor(0.09290304)),
            ("square_yard", Factor(0.83612736)),
            ("acre", Factor(4046.8564224)),
            ("hectare", Factor(10000.0)),
        ],
    },
    Category {
        name: "volume",
        base: "liter",
        units: &[
            ("milliliter", Factor(0.001)),
            ("liter", Factor(1.0)),
            ("cubic_meter", Factor(1000.0)),
            ("gallon", Factor(3.785411784)),
            ("quart", Factor(0.946352946)),
            ("pint", Factor(0.473176473)),
            ("fluid_ounce", Factor(0.0295735295625)),
            ("cubic_inch", Factor(0.016387064)),
            ("cubic_foot", Factor(28.316846592)),
        ],
    },
    Category {
        name: "mass",
        base: "kilogram",
        units: &[
            ("microgram", Factor(1e-9)),
            ("milligram", Factor(1e-6)),
            ("gram", Factor(0.001)),
            ("kilogram", Factor(1.0)),
            ("tonne", Factor(1000.0)),
            ("ounce", Factor(0.028349523125)),
            ("pound", Factor(0.45359237)),
            ("stone", Factor(6.35029318)),
        ],
    },
    Category {
        name: "temperature",
        base: "celsius",
        units: &[
            ("celsius", Scale::Celsius),
            ("fahrenheit", Scale::Fahrenheit),
            ("kelvin", Scale::Kelvin),
        ],
    },
    Category {
        name: "pressure",
        base: "pascal",
        units: &[
            ("pascal", Factor(1.0)),
            ("kilopascal", Factor(1000.0)),
            ("bar", Factor(100000.0)),
            ("atmosphere", Factor(101325.0)),
            ("psi", Factor(6894.757293168)),
            ("torr", Factor(133.322368421)),
            ("mmhg", Factor(133.322387415)),
        ],
    },
    Category {
        name: "energy",
        base: "joule",
        units: &[
            ("joule", Factor(1.0)),
            ("kilojoule", Factor(1000.0)),
            ("calorie", Factor(4.184)),
            ("kilocalorie", Factor(4184.0)),
            ("watt_hour", Factor(3600.0)),
            ("kilowatt_hour", Factor(3.6e6)),
            ("btu", Factor(1055.05585262)),
        ],
    },
    Category {
        name: "power",
        base: "watt",
        units: &[
            ("watt", Factor(1.0)),
            ("kilowatt", Factor(1000.0)),
            ("horsepower", Factor(745.69987158227)),
            ("btu_per_hour", Factor(0.29307107)),
        ],
    },
    Category {
        name: "speed",
        base: "meter_per_second",
        units: &[
            ("meter_per_second", Factor(1.0)),
            ("kilometer_per_hour", Factor(1000.0 / 3600.0)),
            ("mile_per_hour", Factor(0.44704)),
            ("knot", Factor(1852.0 / 3600.0)),
            ("foot_per_second", Factor(0.3048)),
        ],
    },
    Category {
        name: "time",
        base: "second",
        units: &[
            ("nanosecond", Factor(1e-9)),
            ("microsecond", Factor(1e-6)),
            ("millisecond", Factor(0.001)),
            ("second", Factor(1.0)),
            ("minute", Factor(60.0)),
            ("hour", Factor(3600.0)),
            ("day", Factor(86400.0)),
            ("week", Factor(604800.0)),
            ("year", Factor(31536000.0)),
        ],
    },
    Category {
        name: "angle",
        base: "radian",
        units: &[
            ("radian", Factor(1.0)),
            ("degree", Factor(std::f64::consts::PI / 180.0)),
            ("gradian", Factor(std::f64::consts::PI / 200.0)),
            ("arcminute", Factor(std::f64::consts::PI / 10800.0)),
            ("arcsecond", Factor(std::f64::consts::PI / 648000.0)),
        ],
    },
    Category {
        name: "data",
        base: "byte",
        units: &[
            ("bit", Factor(0.125)),
            ("byte", Factor(1.0)),
            ("kilobyte", Factor(KIB)),
            ("megabyte", Factor(KIB * KIB)),
            ("gigabyte", Factor(KIB * KIB * KIB)),
            ("terabyte", Factor(KIB * KIB * KIB * KIB)),
        ],
    },
    Category {
        name: "fuel_efficiency",
        base: "kilometer_per_liter",
        units: &[
            ("kilometer_per_liter", Factor(1.0)),
            ("mile_per_gallon", Factor(0.425143707)),
            ("liter_per_100km", Scale::Reciprocal(100.0)),
        ],
    },
    Category {
        name: "torque",
        base: "newton_meter",
        units: &[
            ("newton_meter", Factor(1.0)),
            ("foot_pound", Factor(1.3558179483)),
            ("inch_pound", Factor(0.1129848290)),
        ],
    },
    Category {
        name: "frequency",
        base: "hertz",
        units: &[
            ("hertz", Factor(1.0)),
            ("kilohertz", Factor(1e3)),
            ("megahertz", Factor(1e6)),
            ("gigahertz", Factor(1e9)),
        ],
    },
    Category {
        name: "force",
        base: "newton",
        units: &[
            ("newton", Factor(1.0)),
            ("kilonewton", Factor(1000.0)),
            ("dyne", Factor(1e-5)),
            ("pound_force", Factor(4.4482216152605)),
            ("kilogram_force", Factor(9.80665)),
        ],
    },
];

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub base: &'static str,
    pub units: Vec<&'static str>,
}

pub fn categories() -> Vec<CategoryInfo> {
    CATEGORIES
        .iter()
        .map(|c| CategoryInfo {
            name: c.name,
            base: c.base,
            units: c.units.iter().map(|(name, _)| *name).collect(),
        })
        .collect()
}

fn find_unit(category: &Category, unit: &str) -> Result<Scale, ToolError> {
    category
        .units
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, scale)| *scale)
        .ok_or_else(|| ToolError::unsupported("unit", format!("{} ({})", unit, category.name)))
}

/// Convert `value` between two units of the same category
pub fn convert(category: &str, value: f64, from: &str, to: &str) -> Result<f64, ToolError> {
    if !value.is_finite() {
        return Err(ToolError::invalid("Value must be a finite number"));
    }
    let category = CATEGORIES
        .iter()
        .find(|c| c.name == category)
        .ok_or_else(|| ToolError::unsupported("category", category))?;

    let from_scale = find_unit(category, from)?;
    let to_scale = find_unit(category, to)?;

    if matches!(from_scale, Scale::Reciprocal(_)) && value == 0.0 {
        return Err(ToolError::invalid(format!("{} cannot be zero", from)));
    }
    let base = from_scale.to_base(value);
    if matches!(to_scale, Scale::Reciprocal(_)) && base == 0.0 {
        return Err(ToolError::invalid(format!("Cannot express zero in {}", to)));
    }

    Ok(to_scale.from_base(base))
}
