//! VM size capability tables

/// GPU sizes with an NVIDIA driver agreement
const NVIDIA_ENABLED_SKUS: &[&str] = &[
    // K80
    "Standard_NC6",
    "Standard_NC12",
    "Standard_NC24",
    "Standard_NC24r",
    // M60
    "Standard_NV6",
    "Standard_NV12",
    "Standard_NV12s_v3",
    "Standard_NV24",
    "Standard_NV24s_v3",
    "Standard_NV24r",
    "Standard_NV48s_v3",
    // P40
    "Standard_ND6s",
    "Standard_ND12s",
    "Standard_ND24s",
    "Standard_ND24rs",
    // P100
    "Standard_NC6s_v2",
    "Standard_NC12s_v2",
    "Standard_NC24s_v2",
    "Standard_NC24rs_v2",
    // V100
    "Standard_NC6s_v3",
    "Standard_NC12s_v3",
    "Standard_NC24s_v3",
    "Standard_NC24rs_v3",
    "Standard_ND40s_v3",
    "Standard_ND40rs_v2",
];

/// Sizes that support accelerated networking
const ACCELERATED_NETWORKING_SKUS: &[&str] = &[
    "Standard_B12ms", "Standard_B16ms", "Standard_B20ms", "Standard_D11_v2", "Standard_D12_v2",
    "Standard_D13_v2", "Standard_D14_v2", "Standard_D15_v2", "Standard_D16_v3", "Standard_D16a_v4",
    "Standard_D16as_v4", "Standard_D16s_v3", "Standard_D2_v2", "Standard_D32_v3", "Standard_D32a_v4",
    "Standard_D32as_v4", "Standard_D32s_v3", "Standard_D3_v2", "Standard_D48_v3", "Standard_D48s_v3",
    "Standard_D4_v2", "Standard_D4_v3", "Standard_D4a_v4", "Standard_D4as_v4", "Standard_D4s_v3",
    "Standard_D5_v2", "Standard_D64_v3", "Standard_D64s_v3", "Standard_D8_v3", "Standard_D8a_v4",
    "Standard_D8as_v4", "Standard_D8s_v3", "Standard_DS11-1_v2", "Standard_DS11_v2", "Standard_DS12-1_v2",
    "Standard_DS12-2_v2", "Standard_DS12_v2", "Standard_DS13-2_v2", "Standard_DS13-4_v2", "Standard_DS13_v2",
    "Standard_DS14-4_v2", "Standard_DS14-8_v2", "Standard_DS14_v2", "Standard_DS15_v2", "Standard_DS2_v2",
    "Standard_DS3_v2", "Standard_DS4_v2", "Standard_DS5_v2", "Standard_E16-4s_v3", "Standard_E16-8s_v3",
    "Standard_E16_v3", "Standard_E16a_v4", "Standard_E16as_v4", "Standard_E16s_v3", "Standard_E20_v3",
    "Standard_E20a_v4", "Standard_E20as_v4", "Standard_E20s_v3", "Standard_E32-16s_v3", "Standard_E32-8s_v3",
    "Standard_E32_v3", "Standard_E32a_v4", "Standard_E32as_v4", "Standard_E32s_v3", "Standard_E4-2s_v3",
    "Standard_E48_v3", "Standard_E48as_v4", "Standard_E48s_v3", "Standard_E4_v3", "Standard_E4a_v4",
    "Standard_E4as_v4", "Standard_E4s_v3", "Standard_E64-16s_v3", "Standard_E64-32s_v3", "Standard_E64_v3",
    "Standard_E64as_v4", "Standard_E64i_v3", "Standard_E64is_v3", "Standard_E64s_v3", "Standard_E8-2s_v3",
    "Standard_E8-4s_v3", "Standard_E8_v3", "Standard_E8a_v4", "Standard_E8as_v4", "Standard_E8s_v3",
    "Standard_E96as_v4", "Standard_F16", "Standard_F16s", "Standard_F16s_v2", "Standard_F2",
    "Standard_F2s", "Standard_F32s_v2", "Standard_F4", "Standard_F48s_v2", "Standard_F4s",
    "Standard_F4s_v2", "Standard_F64s_v2", "Standard_F72s_v2", "Standard_F8", "Standard_F8s",
    "Standard_F8s_v2", "Standard_L16s_v2", "Standard_L32s_v2", "Standard_L48s_v2", "Standard_L64s_v2",
    "Standard_L80s_v2", "Standard_L8s_v2", "Standard_M128", "Standard_M128-32ms", "Standard_M128-64ms",
    "Standard_M128m", "Standard_M128ms", "Standard_M128s", "Standard_M16-4ms", "Standard_M16-8ms",
    "Standard_M16ms", "Standard_M208ms_v2", "Standard_M208s_v2", "Standard_M32-16ms", "Standard_M32-8ms",
    "Standard_M32ls", "Standard_M32ms", "Standard_M32ts", "Standard_M416ms_v2", "Standard_M416s_v2",
    "Standard_M64", "Standard_M64-16ms", "Standard_M64-32ms", "Standard_M64ls", "Standard_M64m",
    "Standard_M64ms", "Standard_M64s", "Standard_M8-2ms", "Standard_M8-4ms", "Standard_M8ms",
    // grandfathered
    "AZAP_Performance_ComputeV17C", "SQLGL", "SQLGLCore", "Standard_D12_v2_ABC",
    "Standard_D13_v2_ABC", "Standard_D14_v2_ABC", "Standard_D15_v2_ABC", "Standard_D32-16s_v3",
    "Standard_D32-8s_v3", "Standard_D3_v2_ABC", "Standard_D40_v3", "Standard_D40s_v3",
    "Standard_D4_v2_ABC", "Standard_D5_v2_ABC", "Standard_D64-16s_v3", "Standard_D64-32s_v3",
    "Standard_E32-16_v3", "Standard_F16_ABC", "Standard_F4_ABC", "Standard_F8_ABC",
    "Standard_L96s_v2",
];

fn trim_promo(vm_size: &str) -> &str {
    vm_size.strip_suffix("_Promo").unwrap_or(vm_size)
}

/// Whether the VM size is an NVIDIA-enabled N-series SKU
pub fn is_nvidia_enabled_sku(vm_size: &str) -> bool {
    NVIDIA_ENABLED_SKUS.contains(&trim_promo(vm_size))
}

/// Whether the VM size supports accelerated networking
pub fn accelerated_networking_supported(vm_size: &str) -> bool {
    ACCELERATED_NETWORKING_SKUS.contains(&trim_promo(vm_size))
}
