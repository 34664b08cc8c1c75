//! WMO weather interpretation codes as used by Open-Meteo.
//! See: https://open-meteo.com/en/docs#weathervariables

/// Icon shown for codes outside the WMO table
pub const FALLBACK_ICON: &str = "cloud";

/// Condition text for codes outside the WMO table
pub const FALLBACK_DESCRIPTION: &str = "Condição desconhecida";

/// Icon identifier for a weather code, picking the night variant where one exists
pub fn icon_for(code: i32, is_day: bool) -> &'static str {
    match code {
        0 if is_day => "sun",
        0 => "moon",
        1 | 2 if is_day => "cloud_sun",
        1 | 2 => "cloud_moon",
        3 => "cloud",
        45 | 48 => "cloud_fog",
        51 | 53 | 55 | 56 | 57 => "cloud_drizzle",
        61 | 63 | 66 | 80 | 81 => "cloud_rain",
        65 | 67 | 82 => "cloud_rain_heavy",
        71 | 73 | 75 | 77 | 85 | 86 => "cloud_snow",
        95 | 96 | 99 => "cloud_lightning",
        _ => FALLBACK_ICON,
    }
}

/// Human-readable (pt-BR) condition for a weather code
pub fn description_for(code: i32) -> &'static str {
    match code {
        0 => "Céu limpo",
        1 => "Predominantemente limpo",
        2 => "Parcialmente nublado",
        3 => "Nublado",
        45 => "Nevoeiro",
        48 => "Nevoeiro com geada",
        51 => "Garoa leve",
        53 => "Garoa moderada",
        55 => "Garoa intensa",
        56 => "Garoa congelante leve",
        57 => "Garoa congelante intensa",
        61 => "Chuva leve",
        63 => "Chuva moderada",
        65 => "Chuva forte",
        66 => "Chuva congelante leve",
        67 => "Chuva congelante forte",
        71 => "Neve leve",
        73 => "Neve moderada",
        75 => "Neve forte",
        77 => "Grãos de neve",
        80 => "Pancadas de chuva leves",
        81 => "Pancadas de chuva moderadas",
        82 => "Pancadas de chuva violentas",
        85 => "Pancadas de neve leves",
        86 => "Pancadas de neve fortes",
        95 => "Trovoada",
        96 => "Trovoada com granizo leve",
        99 => "Trovoada com granizo forte",
        _ => FALLBACK_DESCRIPTION,
    }
}
