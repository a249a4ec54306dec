//! Root causes and actions per anomaly category

use crate::logic::detection::AnomalyCategory;

pub struct Playbook {
    pub root_causes: &'static [&'static str],
    pub actions: &'static [&'static str],
}

pub fn playbook(category: AnomalyCategory) -> &'static Playbook {
    use AnomalyCategory::*;
    match category {
        CriticalTemperature => &CRITICAL_TEMPERATURE,
        TemperatureTrend => &TEMPERATURE_TREND,
        TemperatureOscillation => &TEMPERATURE_OSCILLATION,
        NetworkSpike => &NETWORK_SPIKE,
        MultipleConnections => &MULTIPLE_CONNECTIONS,
        HighTxVolume => &HIGH_TX_VOLUME,
        ExcessiveHumidity => &EXCESSIVE_HUMIDITY,
        TempHumidityCorrelation => &TEMP_HUMIDITY_CORRELATION,
        DivergingBehavior => &DIVERGING_BEHAVIOR,
        ErraticPattern => &ERRATIC_PATTERN,
        Unclassified => &GENERIC,
    }
}

static CRITICAL_TEMPERATURE: Playbook = Playbook {
    root_causes: &[
        "Cooling system failure or blocked airflow",
        "Electrical short circuit or overloaded component",
        "Fire or external heat source near the device",
    ],
    actions: &[
        "Power down the device and its load immediately",
        "Evacuate the area if smoke or burning smell is reported",
        "Engage emergency cooling and check fire-safety equipment",
        "Inspect wiring and power supply before restarting",
    ],
};

static TEMPERATURE_TREND: Playbook = Playbook {
    root_causes: &[
        "Progressive degradation of ventilation or fans",
        "Dust accumulation on heat sinks",
        "Rising ambient temperature in the enclosure",
    ],
    actions: &[
        "Check fans and ventilation openings",
        "Clean heat sinks and filters",
        "Plan thermal maintenance of the enclosure",
    ],
};

static TEMPERATURE_OSCILLATION: Playbook = Playbook {
    root_causes: &[
        "Faulty or loose temperature sensor",
        "Thermostat or HVAC cycling too aggressively",
        "Intermittent electrical contact",
    ],
    actions: &[
        "Recalibrate the temperature sensor against a reference",
        "Check sensor wiring and connectors",
        "Review HVAC control loop settings",
    ],
};

static NETWORK_SPIKE: Playbook = Playbook {
    root_causes: &[
        "Possible data exfiltration or compromised firmware",
        "Device enrolled in a botnet / DDoS activity",
        "Misconfigured publish loop flooding the broker",
    ],
    actions: &[
        "Isolate the device on a quarantine VLAN",
        "Capture and inspect outbound traffic",
        "Run a security audit of the device and its credentials",
    ],
};

static MULTIPLE_CONNECTIONS: Playbook = Playbook {
    root_causes: &[
        "Brute-force or credential-stuffing attempts on the broker",
        "Cloned device identity connecting from several hosts",
        "Reconnect storm after network instability",
    ],
    actions: &[
        "Enforce broker authentication and rotate device credentials",
        "Restrict allowed sources with firewall rules",
        "Review broker connection logs for the device",
    ],
};

static HIGH_TX_VOLUME: Playbook = Playbook {
    root_causes: &[
        "Telemetry interval misconfigured (too frequent)",
        "Firmware bug resending buffered data",
        "Unauthorized payload uploaded by the device",
    ],
    actions: &[
        "Apply rate limiting / throttling on the device topic",
        "Review the firmware version and recent updates",
        "Compare payload sizes with the device baseline",
    ],
};

static EXCESSIVE_HUMIDITY: Playbook = Playbook {
    root_causes: &[
        "Water ingress in the enclosure",
        "Condensation due to temperature swings",
        "Damaged seals or gaskets",
    ],
    actions: &[
        "Inspect the enclosure for water ingress",
        "Replace seals and add desiccant",
        "Check drainage around the installation",
    ],
};

static TEMP_HUMIDITY_CORRELATION: Playbook = Playbook {
    root_causes: &[
        "Climate control malfunction",
        "Door or vent left open",
        "Sensor module drifting on both channels",
    ],
    actions: &[
        "Inspect the climate control system",
        "Verify doors and vents of the monitored room",
        "Cross-check both readings with a reference sensor",
    ],
};

static DIVERGING_BEHAVIOR: Playbook = Playbook {
    root_causes: &[
        "Several metrics departing from the device baseline at once",
        "Change of installation or usage not reflected in the baseline",
        "Early sign of hardware failure",
    ],
    actions: &[
        "Run a full audit of all device metrics",
        "Confirm recent changes with the site operator",
        "Retrain the model if the new behavior is legitimate",
    ],
};

static ERRATIC_PATTERN: Playbook = Playbook {
    root_causes: &[
        "Unstable power supply or brownouts",
        "Device rebooting or clock drift",
        "Activity at unusual hours",
    ],
    actions: &[
        "Check power supply stability (voltage, UPS)",
        "Inspect reboot counters and device clock",
        "Verify whether activity at this time is expected",
    ],
};

static GENERIC: Playbook = Playbook {
    root_causes: &["Unclassified deviation from normal device behavior"],
    actions: &[
        "Inspect the device physically and check its logs",
        "Compare with recent readings of the same device",
    ],
};
