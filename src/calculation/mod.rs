/// 年度平均、最低、最高價
pub mod yearly_average;
