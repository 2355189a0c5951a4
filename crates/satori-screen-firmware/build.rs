use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let sdkconfig_defaults = PathBuf::from(&manifest_dir).join("sdkconfig.defaults");

    println!("cargo:rerun-if-changed=sdkconfig.defaults");
    println!("cargo:rerun-if-changed=partitions.csv");

    if env::var("ESP_IDF_SDKCONFIG_DEFAULTS").is_err() {
        eprintln!("WARNING: ESP_IDF_SDKCONFIG_DEFAULTS not set! SPIFFS partition and stack size may be wrong.");
        eprintln!("Build with: export ESP_IDF_SDKCONFIG_DEFAULTS=crates/satori-screen-firmware/sdkconfig.defaults");
    }

    // esp-idf-sys keeps its generated sdkconfig across builds; drop it when
    // the defaults are newer so edits take effect.
    let target_dir = PathBuf::from(&manifest_dir).join("target");
    for build_dir in esp_idf_sys_build_dirs(&target_dir) {
        let sdkconfig = build_dir.join("out/esp-idf/sdkconfig");
        if is_newer(&sdkconfig_defaults, &sdkconfig) {
            eprintln!("sdkconfig.defaults changed! Forcing regeneration...");
            let _ = fs::remove_file(&sdkconfig);
            let _ = fs::remove_dir_all(build_dir.join("out/esp-idf/sdkconfig.d"));
        }
    }

    embuild::espidf::sysenv::output();
}

fn esp_idf_sys_build_dirs(target_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(profiles) = fs::read_dir(target_dir) else {
        return found;
    };
    for profile in profiles.flatten() {
        let Ok(builds) = fs::read_dir(profile.path().join("build")) else {
            continue;
        };
        for build in builds.flatten() {
            let path = build.path();
            if path.to_string_lossy().contains("esp-idf-sys") {
                found.push(path);
            }
        }
    }
    found
}

fn is_newer(source: &Path, generated: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(source), modified(generated)) {
        (Some(source), Some(generated)) => source > generated,
        _ => false,
    }
}
