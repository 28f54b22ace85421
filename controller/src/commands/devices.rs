use logging::Logger;
use vision::CameraDetection;

use super::CommandResult;

pub fn run(logger: &Logger) -> CommandResult {
    let devices = CameraDetection::list_devices(&logger.for_component("detection"))?;

    if devices.is_empty() {
        println!("No capture devices found");
        return Ok(());
    }

    for device in &devices {
        println!("{}", device);
    }
    Ok(())
}
