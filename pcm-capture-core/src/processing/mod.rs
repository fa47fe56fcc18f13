pub mod pcm_to_wav;
pub mod wav_format;
