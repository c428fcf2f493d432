pub mod codefile;
pub mod kuro;
pub mod modem;
pub mod pwm;
pub mod sharp;
