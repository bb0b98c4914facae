use apng_assembler::apng::{parse, Animation};
use apng_assembler::Error;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// 打印 APNG 文件的画布、循环次数和每一帧的参数
pub fn inspect(path: &Path) -> Result<(), Error> {
    let bytes = fs::read(path)?;
    let animation = parse(&bytes)?;
    print!("{}", describe(&animation));
    Ok(())
}

fn describe(animation: &Animation) -> String {
    let plays = match animation.num_plays {
        0 => "infinite".to_string(),
        n => n.to_string(),
    };
    let mut text = format!(
        "{} {}x{}, {} frames, plays: {}, total {} ms\n",
        "APNG".green().bold(),
        animation.width,
        animation.height,
        animation.frames.len(),
        plays,
        animation.play_time_ms
    );
    for (index, frame) in animation.frames.iter().enumerate() {
        text.push_str(&format!(
            "  #{:<4} {}x{} at ({}, {})  delay {}/{} ({} ms)  dispose {} blend {}  {} data chunks\n",
            index,
            frame.width,
            frame.height,
            frame.x_offset,
            frame.y_offset,
            frame.delay_num,
            frame.delay_den,
            frame.delay_ms(),
            frame.dispose_op,
            frame.blend_op,
            frame.data.len()
        ));
    }
    text
}
